//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth` - 가입, 로그인, 토큰 갱신
//! - `/users` - 내 프로필
//! - `/jobs` - 채용 공고
//! - `/applications` - 지원서

pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod users;

pub use applications::{
    applications_router, ApplicationResponse, MyApplicationsResponse,
    ReceivedApplicationsResponse,
};
pub use auth::{auth_router, AuthResponse, RefreshResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use jobs::{jobs_router, JobResponse, JobsListResponse};
pub use users::{users_router, UserResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/jobs", jobs_router())
        .nest("/applications", applications_router())
}
