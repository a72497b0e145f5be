//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 핸들러는 trait 객체(`Arc<dyn ...>`)로 저장소를 사용하므로
//! PostgreSQL 구현과 메모리 구현을 바꿔 끼울 수 있습니다.

pub mod applications;
pub mod jobs;
pub mod memory;
pub mod users;

pub use applications::{ApplicationRepository, PgApplicationRepository};
pub use jobs::{JobRepository, PgJobRepository};
pub use memory::InMemoryStore;
pub use users::{PgUserRepository, UserRepository};

use careerlaunch_core::BoardError;

/// sqlx 에러를 데이터베이스 에러로 변환.
pub(crate) fn db_error(err: sqlx::Error) -> BoardError {
    BoardError::Database(err.to_string())
}

/// 유일성 제약 위반이면 `on_unique`, 아니면 데이터베이스 에러.
pub(crate) fn unique_violation_or(err: sqlx::Error, on_unique: BoardError) -> BoardError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_unique,
        _ => db_error(err),
    }
}
