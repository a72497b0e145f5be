//! CareerLaunch 채용 게시판 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 인증 (Access/Refresh Token) 및 역할 기반 접근 제어
//! - PostgreSQL/메모리 저장소
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 관리
//! - [`repository`]: 저장소 trait과 구현
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use auth::{
    AuthenticatedIdentity, CandidateAuth, CredentialHasher, JwtAuth, RecruiterAuth, TokenService,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::{error_detail_layer, metrics_layer};
pub use routes::create_api_router;
pub use state::{create_default_test_state, create_test_state, AppState};

/// 상태가 주입된 API 라우터와 공통 미들웨어를 조합합니다.
///
/// `/metrics`, CORS, 타임아웃은 바이너리에서 추가합니다.
pub fn create_app(state: Arc<AppState>) -> Router {
    let environment = state.environment;

    create_api_router()
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            environment,
            error_detail_layer,
        ))
        .layer(axum::middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
}
