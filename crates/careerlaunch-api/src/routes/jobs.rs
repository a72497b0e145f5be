//! 채용 공고 API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /jobs` - 공고 등록 (recruiter)
//! - `GET /jobs?type=&title=` - 열린 공고 목록 (candidate)
//! - `GET /jobs/mine` - 내가 올린 공고 목록 (recruiter)
//! - `GET /jobs/{id}` - 공고 상세 (candidate, 닫힌 공고는 404)
//! - `PATCH /jobs/{id}/status` - 공고 열기/닫기 (recruiter, 소유자)

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use careerlaunch_core::{parse_skills, Job, JobFilter, JobStatus, NewJob};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{require_owner, CandidateAuth, RecruiterAuth};
use crate::error::{optional_trimmed, ApiError, ApiResult, RequiredFields};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 기술 스택 입력: JSON 배열 또는 쉼표 구분 문자열
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    /// trim 후 빈 항목 제거.
    pub fn into_skills(self) -> Vec<String> {
        match self {
            SkillsInput::Csv(raw) => parse_skills(&raw),
            SkillsInput::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// 공고 등록 요청
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills: Option<SkillsInput>,
}

/// 공고 상태 변경 요청
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobStatusRequest {
    pub status: Option<String>,
}

/// 단일 공고 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub job: Job,
}

/// 공고 목록 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct JobsListResponse {
    pub jobs: Vec<Job>,
}

/// 경로의 ID 파싱. UUID가 아니면 해당 리소스가 없는 것으로 취급합니다.
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(what))
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /jobs - 공고 등록
async fn create_job(
    State(state): State<Arc<AppState>>,
    RecruiterAuth(identity): RecruiterAuth,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JobResponse>)> {
    let Json(request) = payload?;

    let mut required = RequiredFields::new();
    let title = required.take("title", request.title);
    let job_type = required.take("type", request.job_type);
    let company = required.take("company", request.company);
    required.finish()?;

    let job = state
        .jobs
        .create(NewJob {
            title,
            job_type,
            company,
            location: optional_trimmed(request.location),
            description: optional_trimmed(request.description),
            skills: request.skills.map(SkillsInput::into_skills).unwrap_or_default(),
            recruiter_id: identity.user_id,
        })
        .await?;

    info!(job_id = %job.id, recruiter_id = %identity.user_id, "Job created");
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

/// GET /jobs - 열린 공고 목록 (최신순)
async fn list_jobs(
    State(state): State<Arc<AppState>>,
    CandidateAuth(_identity): CandidateAuth,
    query: Result<Query<JobFilter>, QueryRejection>,
) -> ApiResult<Json<JobsListResponse>> {
    let Query(filter) = query?;
    debug!(?filter, "열린 공고 목록 조회");
    let jobs = state.jobs.list_open(&filter).await?;
    Ok(Json(JobsListResponse { jobs }))
}

/// GET /jobs/mine - 내가 올린 공고 목록
async fn my_jobs(
    State(state): State<Arc<AppState>>,
    RecruiterAuth(identity): RecruiterAuth,
) -> ApiResult<Json<JobsListResponse>> {
    let jobs = state.jobs.list_by_recruiter(identity.user_id).await?;
    Ok(Json(JobsListResponse { jobs }))
}

/// GET /jobs/{id} - 공고 상세
async fn get_job(
    State(state): State<Arc<AppState>>,
    CandidateAuth(_identity): CandidateAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = parse_id(&id, "Job")?;

    let job = state
        .jobs
        .find_by_id(id)
        .await?
        .filter(Job::is_open)
        .ok_or_else(|| ApiError::not_found("Job"))?;

    Ok(Json(JobResponse { job }))
}

/// PATCH /jobs/{id}/status - 공고 열기/닫기
async fn update_job_status(
    State(state): State<Arc<AppState>>,
    RecruiterAuth(identity): RecruiterAuth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateJobStatusRequest>, JsonRejection>,
) -> ApiResult<Json<JobResponse>> {
    let Json(request) = payload?;
    let status = request
        .status
        .as_deref()
        .and_then(JobStatus::parse)
        .ok_or_else(|| ApiError::validation("Invalid status"))?;

    let id = parse_id(&id, "Job")?;
    let job = state
        .jobs
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;

    require_owner(&identity, job.recruiter_id)?;

    let job = state
        .jobs
        .set_status(job.id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;

    info!(job_id = %job.id, status = %job.status, "Job status changed");
    Ok(Json(JobResponse { job }))
}

/// 채용 공고 라우터 생성.
pub fn jobs_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/mine", get(my_jobs))
        .route("/{id}", get(get_job))
        .route("/{id}/status", patch(update_job_status))
}
