//! # CareerLaunch Core
//!
//! 채용 게시판의 핵심 도메인 모델 및 공용 인프라를 제공합니다:
//! - 사용자, 채용 공고, 지원서 도메인 타입
//! - 설정 관리
//! - 로깅 인프라
//! - 주입 가능한 시간 소스

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use clock::{Clock, FixedClock, SystemClock};
pub use self::config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, LoggingConfig, ServerConfig,
    DEV_ACCESS_SECRET, DEV_REFRESH_SECRET, MAX_ACCESS_TOKEN_TTL_MINUTES, MAX_REFRESH_TOKEN_TTL_DAYS,
};
pub use domain::*;
pub use error::*;
pub use logging::*;
