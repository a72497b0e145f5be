//! 채용 공고 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 공고 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// 모집 중 - 지원자에게 노출
    #[default]
    Open,
    /// 마감
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(JobStatus::Open),
            "closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 채용 공고.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    /// 고용 형태 (예: "FULLTIME", "INTERNSHIP")
    #[serde(rename = "type")]
    pub job_type: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    /// 공고를 등록한 채용담당자 ID
    pub recruiter_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }
}

/// 공고 생성 입력.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub job_type: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills: Vec<String>,
    pub recruiter_id: Uuid,
}

/// 모집 중 공고 목록 필터.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    /// 고용 형태 (정확히 일치)
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    /// 제목 (대소문자 무시 부분 일치)
    pub title: Option<String>,
}

impl JobFilter {
    /// 값을 trim하고 공백만 있는 조건은 버린 필터.
    ///
    /// 모든 저장소 구현은 이 결과로 조회합니다.
    pub fn normalized(&self) -> Self {
        fn clean(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            job_type: clean(self.job_type.as_deref()),
            title: clean(self.title.as_deref()),
        }
    }

    /// 공고가 필터 조건을 만족하는지 확인.
    ///
    /// 상태는 확인하지 않습니다. 모집 중 여부는 호출자가 판단합니다.
    pub fn matches(&self, job: &Job) -> bool {
        let filter = self.normalized();
        if let Some(job_type) = filter.job_type.as_deref() {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(title) = filter.title.as_deref() {
            if !job.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// 쉼표로 구분된 기술 목록 파싱.
///
/// 각 항목의 공백을 제거하고 빈 항목은 버립니다.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
