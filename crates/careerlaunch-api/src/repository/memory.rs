//! 프로세스 내 메모리 저장소.
//!
//! 데이터베이스가 설정되지 않았을 때와 테스트에서 사용합니다.
//! 세 저장소 trait을 모두 구현하며, 레코드는 삽입 순서로 보관되어
//! 역순 순회가 곧 최신순입니다.

use async_trait::async_trait;
use careerlaunch_core::{
    normalize_email, Application, ApplicationStatus, BoardError, BoardResult,
    CandidateApplication, CandidateSummary, Job, JobFilter, JobStatus, JobSummary,
    NewApplication, NewJob, NewUser, ProfileUpdate, ReceivedApplication, Role, User,
};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApplicationRepository, JobRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    fn job_summary(&self, id: Uuid) -> BoardResult<JobSummary> {
        let job = self
            .job(id)
            .ok_or_else(|| BoardError::CorruptRecord(format!("dangling job reference {}", id)))?;
        Ok(JobSummary {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            job_type: job.job_type.clone(),
            location: job.location.clone(),
            status: job.status,
        })
    }

    fn candidate_summary(&self, id: Uuid) -> BoardResult<CandidateSummary> {
        let user = self
            .user(id)
            .ok_or_else(|| BoardError::CorruptRecord(format!("dangling user reference {}", id)))?;
        Ok(CandidateSummary {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            school: user.school.clone(),
        })
    }
}

/// 메모리 저장소.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 역할을 직접 변경합니다.
    ///
    /// API 경로로는 역할을 바꿀 수 없으며, 운영 도구와 테스트에서만 사용합니다.
    pub async fn set_role(&self, id: Uuid, role: Role) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> BoardResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<User>> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn create(&self, user: NewUser) -> BoardResult<User> {
        let email = normalize_email(&user.email);
        let mut tables = self.tables.write().await;

        // 쓰기 잠금 안에서 검사하므로 유일성 제약과 같은 역할
        if tables.users.iter().any(|u| u.email == email) {
            return Err(BoardError::DuplicateEmail);
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email,
            password_hash: user.password_hash,
            phone_number: user.phone_number,
            school: user.school,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> BoardResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            update.apply(user, Utc::now());
            user.clone()
        }))
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn create(&self, job: NewJob) -> BoardResult<Job> {
        let now = Utc::now();
        let created = Job {
            id: Uuid::new_v4(),
            title: job.title,
            job_type: job.job_type,
            company: job.company,
            location: job.location,
            description: job.description,
            skills: job.skills,
            status: JobStatus::Open,
            recruiter_id: job.recruiter_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.jobs.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Job>> {
        Ok(self.tables.read().await.job(id).cloned())
    }

    async fn list_open(&self, filter: &JobFilter) -> BoardResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .rev()
            .filter(|j| j.is_open() && filter.matches(j))
            .cloned()
            .collect())
    }

    async fn list_by_recruiter(&self, recruiter_id: Uuid) -> BoardResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .rev()
            .filter(|j| j.recruiter_id == recruiter_id)
            .cloned()
            .collect())
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) -> BoardResult<Option<Job>> {
        let mut tables = self.tables.write().await;
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            job.status = status;
            job.updated_at = Utc::now();
            job.clone()
        }))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn create(&self, application: NewApplication) -> BoardResult<Application> {
        let mut tables = self.tables.write().await;

        if tables
            .applications
            .iter()
            .any(|a| a.candidate_id == application.candidate_id && a.job_id == application.job_id)
        {
            return Err(BoardError::DuplicateApplication);
        }

        let now = Utc::now();
        let created = Application {
            id: Uuid::new_v4(),
            candidate_id: application.candidate_id,
            job_id: application.job_id,
            status: ApplicationStatus::Submitted,
            cover_letter: application.cover_letter,
            created_at: now,
            updated_at: now,
        };
        tables.applications.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn list_by_candidate(&self, candidate_id: Uuid) -> BoardResult<Vec<CandidateApplication>> {
        let tables = self.tables.read().await;
        tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.candidate_id == candidate_id)
            .map(|a| {
                Ok(CandidateApplication {
                    application: a.clone(),
                    job: tables.job_summary(a.job_id)?,
                })
            })
            .collect()
    }

    async fn list_for_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> BoardResult<Vec<ReceivedApplication>> {
        let tables = self.tables.read().await;
        tables
            .applications
            .iter()
            .rev()
            .filter(|a| {
                tables
                    .job(a.job_id)
                    .is_some_and(|j| j.recruiter_id == recruiter_id)
            })
            .map(|a| {
                Ok(ReceivedApplication {
                    application: a.clone(),
                    job: tables.job_summary(a.job_id)?,
                    candidate: tables.candidate_summary(a.candidate_id)?,
                })
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BoardResult<Option<Application>> {
        let mut tables = self.tables.write().await;
        Ok(tables.applications.iter_mut().find(|a| a.id == id).map(|application| {
            application.status = status;
            application.updated_at = Utc::now();
            application.clone()
        }))
    }
}
