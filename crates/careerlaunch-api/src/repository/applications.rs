//! Application Repository
//!
//! 지원서 관련 데이터베이스 연산을 담당합니다.
//! 목록 조회는 공고 요약(및 지원자 요약)을 함께 반환합니다.

use async_trait::async_trait;
use careerlaunch_core::{
    Application, ApplicationStatus, BoardError, BoardResult, CandidateApplication,
    CandidateSummary, JobStatus, JobSummary, NewApplication, ReceivedApplication,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{db_error, unique_violation_or};

/// 지원서 저장소.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// 지원서 생성. 같은 (지원자, 공고) 조합이 있으면 `DuplicateApplication`.
    async fn create(&self, application: NewApplication) -> BoardResult<Application>;

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Application>>;

    /// 지원자의 지원서 목록 (공고 요약 포함, 최신순).
    async fn list_by_candidate(&self, candidate_id: Uuid) -> BoardResult<Vec<CandidateApplication>>;

    /// 채용 담당자의 공고에 들어온 지원서 목록 (공고/지원자 요약 포함, 최신순).
    async fn list_for_recruiter(&self, recruiter_id: Uuid)
        -> BoardResult<Vec<ReceivedApplication>>;

    /// 지원서 상태 변경. 지원서가 없으면 None.
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BoardResult<Option<Application>>;
}

// ================================================================================================
// Types
// ================================================================================================

/// applications 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct ApplicationRecord {
    id: Uuid,
    candidate_id: Uuid,
    job_id: Uuid,
    status: String,
    #[sqlx(default)]
    cover_letter: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRecord> for Application {
    type Error = BoardError;

    fn try_from(record: ApplicationRecord) -> Result<Self, Self::Error> {
        let status = ApplicationStatus::parse(&record.status).ok_or_else(|| {
            BoardError::CorruptRecord(format!(
                "application {} has status '{}'",
                record.id, record.status
            ))
        })?;

        Ok(Application {
            id: record.id,
            candidate_id: record.candidate_id,
            job_id: record.job_id,
            status,
            cover_letter: record.cover_letter,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// 공고 요약 컬럼 (jobs 조인)
#[derive(Debug, Clone, FromRow)]
struct JobSummaryRecord {
    job_title: String,
    job_company: String,
    job_type: String,
    #[sqlx(default)]
    job_location: Option<String>,
    job_status: String,
}

impl JobSummaryRecord {
    fn into_summary(self, job_id: Uuid) -> BoardResult<JobSummary> {
        let status = JobStatus::parse(&self.job_status).ok_or_else(|| {
            BoardError::CorruptRecord(format!("job {} has status '{}'", job_id, self.job_status))
        })?;

        Ok(JobSummary {
            id: job_id,
            title: self.job_title,
            company: self.job_company,
            job_type: self.job_type,
            location: self.job_location,
            status,
        })
    }
}

/// 지원자 요약 컬럼 (users 조인)
#[derive(Debug, Clone, FromRow)]
struct CandidateSummaryRecord {
    candidate_first_name: String,
    candidate_last_name: String,
    candidate_email: String,
    #[sqlx(default)]
    candidate_phone_number: Option<String>,
    #[sqlx(default)]
    candidate_school: Option<String>,
}

impl CandidateSummaryRecord {
    fn into_summary(self, candidate_id: Uuid) -> CandidateSummary {
        CandidateSummary {
            id: candidate_id,
            first_name: self.candidate_first_name,
            last_name: self.candidate_last_name,
            email: self.candidate_email,
            phone_number: self.candidate_phone_number,
            school: self.candidate_school,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CandidateApplicationRecord {
    #[sqlx(flatten)]
    application: ApplicationRecord,
    #[sqlx(flatten)]
    job: JobSummaryRecord,
}

#[derive(Debug, Clone, FromRow)]
struct ReceivedApplicationRecord {
    #[sqlx(flatten)]
    application: ApplicationRecord,
    #[sqlx(flatten)]
    job: JobSummaryRecord,
    #[sqlx(flatten)]
    candidate: CandidateSummaryRecord,
}

const APPLICATION_COLUMNS: &str =
    "a.id, a.candidate_id, a.job_id, a.status, a.cover_letter, a.created_at, a.updated_at";

const JOB_SUMMARY_COLUMNS: &str = "j.title AS job_title, j.company AS job_company, \
                                   j.job_type AS job_type, j.location AS job_location, \
                                   j.status AS job_status";

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 지원서 저장소.
#[derive(Debug, Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, application: NewApplication) -> BoardResult<Application> {
        let record = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            INSERT INTO applications (id, candidate_id, job_id, status, cover_letter)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, candidate_id, job_id, status, cover_letter, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application.candidate_id)
        .bind(application.job_id)
        .bind(ApplicationStatus::Submitted.as_str())
        .bind(&application.cover_letter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_or(e, BoardError::DuplicateApplication))?;

        Application::try_from(record)
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Application>> {
        let record = sqlx::query_as::<_, ApplicationRecord>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(Application::try_from).transpose()
    }

    async fn list_by_candidate(&self, candidate_id: Uuid) -> BoardResult<Vec<CandidateApplication>> {
        let records = sqlx::query_as::<_, CandidateApplicationRecord>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}, {JOB_SUMMARY_COLUMNS}
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.candidate_id = $1
            ORDER BY a.created_at DESC
            "#
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        records
            .into_iter()
            .map(|record| {
                let application = Application::try_from(record.application)?;
                let job = record.job.into_summary(application.job_id)?;
                Ok(CandidateApplication { application, job })
            })
            .collect()
    }

    async fn list_for_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> BoardResult<Vec<ReceivedApplication>> {
        let records = sqlx::query_as::<_, ReceivedApplicationRecord>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}, {JOB_SUMMARY_COLUMNS},
                   u.first_name AS candidate_first_name,
                   u.last_name AS candidate_last_name,
                   u.email AS candidate_email,
                   u.phone_number AS candidate_phone_number,
                   u.school AS candidate_school
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN users u ON u.id = a.candidate_id
            WHERE j.recruiter_id = $1
            ORDER BY a.created_at DESC
            "#
        ))
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        records
            .into_iter()
            .map(|record| {
                let application = Application::try_from(record.application)?;
                let job = record.job.into_summary(application.job_id)?;
                let candidate = record.candidate.into_summary(application.candidate_id);
                Ok(ReceivedApplication {
                    application,
                    job,
                    candidate,
                })
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BoardResult<Option<Application>> {
        let record = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            UPDATE applications SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, candidate_id, job_id, status, cover_letter, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(Application::try_from).transpose()
    }
}
