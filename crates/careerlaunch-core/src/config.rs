//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수 순으로 덮어쓰며 [`AppConfig`]를 구성합니다.
//! 구성된 설정은 프로세스 시작 시 한 번 만들어지고 이후 변경되지 않습니다.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

use crate::error::BoardError;

/// 개발용 기본 Access Token 비밀 키. 운영 환경에서는 거부됩니다.
pub const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
/// 개발용 기본 Refresh Token 비밀 키. 운영 환경에서는 거부됩니다.
pub const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

/// Access Token 만료 시간 상한 (분).
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// Refresh Token 만료 시간 상한 (일).
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 실행 환경.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 개발 - 500 응답에 내부 에러 메시지 포함
    #[default]
    Development,
    /// 운영 - 내부 에러 메시지 숨김
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 실행 환경
    #[serde(default)]
    pub environment: Environment,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 쉼표로 구분된 CORS 허용 origin 목록 (없으면 모든 origin 허용)
    #[serde(default)]
    pub cors_origins: Option<String>,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: Environment::Development,
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소를 사용합니다.
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

/// 인증 설정.
///
/// Access/Refresh 토큰은 서로 다른 비밀 키로 서명합니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Access Token 서명 키
    pub access_secret: SecretString,
    /// Refresh Token 서명 키
    pub refresh_secret: SecretString,
    /// Access Token 만료 시간 (분)
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: i64,
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_access_ttl() -> i64 {
    15
}
fn default_refresh_ttl() -> i64 {
    7
}
fn default_bcrypt_cost() -> u32 {
    12
}

impl AuthConfig {
    /// 주어진 비밀 키와 기본 만료 시간/해시 비용으로 설정 생성.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: SecretString::from(access_secret.into()),
            refresh_secret: SecretString::from(refresh_secret.into()),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }

    /// bcrypt 비용을 설정합니다.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// 개발용 기본 비밀 키를 사용 중인지 확인.
    pub fn uses_dev_secrets(&self) -> bool {
        self.access_secret.expose_secret() == DEV_ACCESS_SECRET
            || self.refresh_secret.expose_secret() == DEV_REFRESH_SECRET
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> Result<(), BoardError> {
        let access = self.access_secret.expose_secret();
        let refresh = self.refresh_secret.expose_secret();

        if access.is_empty() || refresh.is_empty() {
            return Err(BoardError::Config("JWT 비밀 키가 비어 있습니다".to_string()));
        }
        if access == refresh {
            return Err(BoardError::Config(
                "Access/Refresh 토큰 비밀 키는 서로 달라야 합니다".to_string(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(BoardError::Config(format!(
                "bcrypt_cost는 4~31 범위여야 합니다: {}",
                self.bcrypt_cost
            )));
        }
        if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&self.access_token_ttl_minutes) {
            return Err(BoardError::Config(format!(
                "access_token_ttl_minutes는 1~{} 범위여야 합니다: {}",
                MAX_ACCESS_TOKEN_TTL_MINUTES, self.access_token_ttl_minutes
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.refresh_token_ttl_days) {
            return Err(BoardError::Config(format!(
                "refresh_token_ttl_days는 1~{} 범위여야 합니다: {}",
                MAX_REFRESH_TOKEN_TTL_DAYS, self.refresh_token_ttl_days
            )));
        }
        Ok(())
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "careerlaunch_api=info,tower_http=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `CAREERLAUNCH__SECTION__KEY` 형식이며,
    /// `JWT_SECRET`, `JWT_REFRESH_SECRET`, `DATABASE_URL`, `API_HOST`, `API_PORT`도 인식합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, BoardError> {
        let mut builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "development")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 10)?
            .set_default("auth.access_secret", DEV_ACCESS_SECRET)?
            .set_default("auth.refresh_secret", DEV_REFRESH_SECRET)?
            .set_default("logging.level", LoggingConfig::default().level)?
            .set_default("logging.format", "pretty")?;

        // 파일에서 로드
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("CAREERLAUNCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.access_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "auth.refresh_secret",
                std::env::var("JWT_REFRESH_SECRET").ok(),
            )?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("API_HOST").ok())?
            .set_override_option("server.port", std::env::var("API_PORT").ok())?
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// 기본 경로(`CAREERLAUNCH_CONFIG` 또는 `config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, BoardError> {
        let path = std::env::var("CAREERLAUNCH_CONFIG")
            .unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load(Some(Path::new(&path)))
    }

    /// 전체 설정 검증.
    ///
    /// 운영 환경에서는 개발용 기본 비밀 키를 허용하지 않습니다.
    pub fn validate(&self) -> Result<(), BoardError> {
        self.auth.validate()?;
        if self.server.environment == Environment::Production && self.auth.uses_dev_secrets() {
            return Err(BoardError::Config(
                "운영 환경에서는 JWT_SECRET / JWT_REFRESH_SECRET 설정이 필요합니다".to_string(),
            ));
        }
        Ok(())
    }
}
