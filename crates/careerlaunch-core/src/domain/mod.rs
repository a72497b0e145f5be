//! 채용 게시판 도메인 모델.
//!
//! - [`user`]: 사용자, 역할, 공개 프로필
//! - [`job`]: 채용 공고와 목록 필터
//! - [`application`]: 지원서와 목록용 요약 타입

pub mod application;
pub mod job;
pub mod user;

pub use application::{
    Application, ApplicationStatus, CandidateApplication, CandidateSummary, JobSummary,
    NewApplication, ReceivedApplication,
};
pub use job::{parse_skills, Job, JobFilter, JobStatus, NewJob};
pub use user::{normalize_email, NewUser, ProfileUpdate, Role, User, UserProfile};
