//! Job Repository
//!
//! 채용 공고 관련 데이터베이스 연산을 담당합니다.

use async_trait::async_trait;
use careerlaunch_core::{BoardError, BoardResult, Job, JobFilter, JobStatus, NewJob};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::db_error;

/// 채용 공고 저장소.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: NewJob) -> BoardResult<Job>;

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Job>>;

    /// 열린 공고 목록 (최신순).
    ///
    /// `type`은 정확히 일치, `title`은 대소문자 무시 부분 일치.
    async fn list_open(&self, filter: &JobFilter) -> BoardResult<Vec<Job>>;

    /// 채용 담당자가 올린 공고 목록 (상태 무관, 최신순).
    async fn list_by_recruiter(&self, recruiter_id: Uuid) -> BoardResult<Vec<Job>>;

    /// 공고 상태 변경. 공고가 없으면 None.
    async fn set_status(&self, id: Uuid, status: JobStatus) -> BoardResult<Option<Job>>;
}

/// jobs 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct JobRecord {
    id: Uuid,
    title: String,
    job_type: String,
    company: String,
    #[sqlx(default)]
    location: Option<String>,
    #[sqlx(default)]
    description: Option<String>,
    skills: Vec<String>,
    status: String,
    recruiter_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRecord> for Job {
    type Error = BoardError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let status = JobStatus::parse(&record.status).ok_or_else(|| {
            BoardError::CorruptRecord(format!("job {} has status '{}'", record.id, record.status))
        })?;

        Ok(Job {
            id: record.id,
            title: record.title,
            job_type: record.job_type,
            company: record.company,
            location: record.location,
            description: record.description,
            skills: record.skills,
            status,
            recruiter_id: record.recruiter_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

const JOB_COLUMNS: &str = "id, title, job_type, company, location, description, skills, \
                           status, recruiter_id, created_at, updated_at";

fn into_jobs(records: Vec<JobRecord>) -> BoardResult<Vec<Job>> {
    records.into_iter().map(Job::try_from).collect()
}

/// PostgreSQL 채용 공고 저장소.
#[derive(Debug, Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, job: NewJob) -> BoardResult<Job> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            INSERT INTO jobs (id, title, job_type, company, location, description,
                              skills, status, recruiter_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.job_type)
        .bind(&job.company)
        .bind(&job.location)
        .bind(&job.description)
        .bind(&job.skills)
        .bind(JobStatus::Open.as_str())
        .bind(job.recruiter_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Job::try_from(record)
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Job>> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(Job::try_from).transpose()
    }

    async fn list_open(&self, filter: &JobFilter) -> BoardResult<Vec<Job>> {
        let filter = filter.normalized();
        let records = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'open'
              AND ($1::text IS NULL OR job_type = $1)
              AND ($2::text IS NULL OR POSITION(LOWER($2) IN LOWER(title)) > 0)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.job_type)
        .bind(filter.title)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        into_jobs(records)
    }

    async fn list_by_recruiter(&self, recruiter_id: Uuid) -> BoardResult<Vec<Job>> {
        let records = sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC"
        ))
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        into_jobs(records)
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> BoardResult<Option<Job>> {
        let record = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            UPDATE jobs SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(Job::try_from).transpose()
    }
}
