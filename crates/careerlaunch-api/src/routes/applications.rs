//! 지원서 API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /applications` - 공고에 지원 (candidate)
//! - `GET /applications/my` - 내 지원서 목록 (candidate)
//! - `GET /applications/received` - 내 공고에 들어온 지원서 목록 (recruiter)
//! - `PATCH /applications/{id}/status` - 합격/불합격 처리 (recruiter, 공고 소유자)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use careerlaunch_core::{
    Application, ApplicationStatus, CandidateApplication, NewApplication, ReceivedApplication,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::jobs::parse_id;
use crate::auth::{require_owner, CandidateAuth, RecruiterAuth};
use crate::error::{optional_trimmed, ApiError, ApiResult, RequiredFields};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 지원 요청
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub job_id: Option<String>,
    pub cover_letter: Option<String>,
}

/// 지원서 상태 변경 요청
#[derive(Debug, Default, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: Option<String>,
}

/// 단일 지원서 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub application: Application,
}

/// 지원자용 목록 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct MyApplicationsResponse {
    pub applications: Vec<CandidateApplication>,
}

/// 채용 담당자용 목록 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceivedApplicationsResponse {
    pub applications: Vec<ReceivedApplication>,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /applications - 공고에 지원
///
/// 공고가 없거나 닫혀 있으면 404, 이미 지원했으면 409.
async fn apply(
    State(state): State<Arc<AppState>>,
    CandidateAuth(identity): CandidateAuth,
    payload: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApplicationResponse>)> {
    let Json(request) = payload?;

    let mut required = RequiredFields::new();
    let job_id = required.take("jobId", request.job_id);
    required.finish()?;

    let job_id = parse_id(&job_id, "Job")?;
    let job = state
        .jobs
        .find_by_id(job_id)
        .await?
        .filter(|job| job.is_open())
        .ok_or_else(|| ApiError::not_found("Job"))?;

    let application = state
        .applications
        .create(NewApplication {
            candidate_id: identity.user_id,
            job_id: job.id,
            cover_letter: optional_trimmed(request.cover_letter),
        })
        .await?;

    info!(
        application_id = %application.id,
        job_id = %job.id,
        candidate_id = %identity.user_id,
        "Application submitted"
    );
    Ok((StatusCode::CREATED, Json(ApplicationResponse { application })))
}

/// GET /applications/my - 내 지원서 목록
async fn my_applications(
    State(state): State<Arc<AppState>>,
    CandidateAuth(identity): CandidateAuth,
) -> ApiResult<Json<MyApplicationsResponse>> {
    let applications = state.applications.list_by_candidate(identity.user_id).await?;
    Ok(Json(MyApplicationsResponse { applications }))
}

/// GET /applications/received - 내 공고에 들어온 지원서 목록
async fn received_applications(
    State(state): State<Arc<AppState>>,
    RecruiterAuth(identity): RecruiterAuth,
) -> ApiResult<Json<ReceivedApplicationsResponse>> {
    let applications = state
        .applications
        .list_for_recruiter(identity.user_id)
        .await?;
    Ok(Json(ReceivedApplicationsResponse { applications }))
}

/// PATCH /applications/{id}/status - 합격/불합격 처리
///
/// 검사 순서: 상태 값(400) → 지원서 존재(404) → 공고 소유자(403) → 변경.
async fn update_application_status(
    State(state): State<Arc<AppState>>,
    RecruiterAuth(identity): RecruiterAuth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateApplicationStatusRequest>, JsonRejection>,
) -> ApiResult<Json<ApplicationResponse>> {
    let Json(request) = payload?;
    let status = request
        .status
        .as_deref()
        .and_then(ApplicationStatus::parse)
        .filter(ApplicationStatus::is_decision)
        .ok_or_else(|| ApiError::validation("Invalid status"))?;

    let id = parse_id(&id, "Application")?;
    let application = state
        .applications
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application"))?;

    // 공고가 사라진 지원서는 누구의 소유도 아님
    let job = state
        .jobs
        .find_by_id(application.job_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("You do not own this resource".to_string()))?;
    require_owner(&identity, job.recruiter_id)?;

    let application = state
        .applications
        .update_status(application.id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Application"))?;

    info!(
        application_id = %application.id,
        status = %application.status,
        "Application status changed"
    );
    Ok(Json(ApplicationResponse { application }))
}

/// 지원서 라우터 생성.
pub fn applications_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(apply))
        .route("/my", get(my_applications))
        .route("/received", get(received_applications))
        .route("/{id}/status", patch(update_application_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_parsing() {
        let request: UpdateApplicationStatusRequest =
            serde_json::from_str(r#"{"status": "hired"}"#).unwrap();
        let status = request
            .status
            .as_deref()
            .and_then(ApplicationStatus::parse)
            .filter(ApplicationStatus::is_decision);
        assert_eq!(status, Some(ApplicationStatus::Hired));

        let status = ApplicationStatus::parse("interview").filter(ApplicationStatus::is_decision);
        assert_eq!(status, None);
    }

    #[test]
    fn test_create_request_uses_camel_case() {
        let request: CreateApplicationRequest =
            serde_json::from_str(r#"{"jobId": "x", "coverLetter": "Hi"}"#).unwrap();
        assert_eq!(request.job_id.as_deref(), Some("x"));
        assert_eq!(request.cover_letter.as_deref(), Some("Hi"));
    }
}
