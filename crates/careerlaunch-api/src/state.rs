//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use careerlaunch_core::{AuthConfig, Clock, Environment, SystemClock};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::{CredentialHasher, PasswordError, TokenService};
use crate::repository::{
    ApplicationRepository, InMemoryStore, JobRepository, PgApplicationRepository,
    PgJobRepository, PgUserRepository, UserRepository,
};

/// 테스트용 Access Token 비밀 키.
pub const TEST_ACCESS_SECRET: &str = "test-access-secret-key-minimum-32-chars";
/// 테스트용 Refresh Token 비밀 키.
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-key-minimum-32-chars";
/// 테스트용 bcrypt 비용 (허용 최솟값).
pub const TEST_BCRYPT_COST: u32 = 4;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소 (자격 증명 포함)
    pub users: Arc<dyn UserRepository>,

    /// 채용 공고 저장소
    pub jobs: Arc<dyn JobRepository>,

    /// 지원서 저장소
    pub applications: Arc<dyn ApplicationRepository>,

    /// 토큰 발급/검증 서비스
    pub tokens: Arc<TokenService>,

    /// bcrypt 해셔
    pub hasher: CredentialHasher,

    /// 실행 환경 (500 응답 상세 노출 여부 결정)
    pub environment: Environment,

    /// 데이터베이스 연결 풀 (PostgreSQL). 없으면 메모리 저장소 사용
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 메모리 저장소로 AppState 생성.
    ///
    /// 데이터베이스는 [`AppState::with_db_pool`]로 연결합니다.
    pub fn new(
        auth: &AuthConfig,
        environment: Environment,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PasswordError> {
        let store = Arc::new(InMemoryStore::new());

        Ok(Self {
            users: store.clone(),
            jobs: store.clone(),
            applications: store,
            tokens: Arc::new(TokenService::new(auth, clock)),
            hasher: CredentialHasher::new(auth.bcrypt_cost)?,
            environment,
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// PostgreSQL 저장소로 교체합니다.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.users = Arc::new(PgUserRepository::new(pool.clone()));
        self.jobs = Arc::new(PgJobRepository::new(pool.clone()));
        self.applications = Arc::new(PgApplicationRepository::new(pool.clone()));
        self.db_pool = Some(pool);
        self
    }

    /// 저장소를 직접 지정합니다. 테스트에서 메모리 저장소를 공유할 때 사용합니다.
    pub fn with_store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.users = store.clone();
        self.jobs = store.clone();
        self.applications = store;
        self.db_pool = None;
        self
    }

    /// 저장소 종류 ("postgres" 또는 "memory").
    pub fn storage_kind(&self) -> &'static str {
        if self.db_pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    ///
    /// 메모리 저장소는 항상 정상입니다.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.environment)
            .field("storage", &self.storage_kind())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// 테스트용 AppState 생성.
///
/// 메모리 저장소, 테스트 비밀 키, bcrypt 비용 4를 사용합니다.
pub fn create_test_state(clock: Arc<dyn Clock>) -> Result<AppState, PasswordError> {
    let auth = AuthConfig::new(TEST_ACCESS_SECRET, TEST_REFRESH_SECRET)
        .with_bcrypt_cost(TEST_BCRYPT_COST);
    AppState::new(&auth, Environment::Development, clock)
}

/// 시스템 시계를 사용하는 테스트용 AppState 생성.
pub fn create_default_test_state() -> Result<AppState, PasswordError> {
    create_test_state(Arc::new(SystemClock))
}
