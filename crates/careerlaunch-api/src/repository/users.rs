//! User Repository
//!
//! 사용자 계정(자격 증명 저장소) 관련 데이터베이스 연산을 담당합니다.
//! 이메일은 항상 trim + 소문자로 정규화된 상태로 저장/조회됩니다.

use async_trait::async_trait;
use careerlaunch_core::{BoardError, BoardResult, NewUser, ProfileUpdate, Role, User};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{db_error, unique_violation_or};

// ================================================================================================
// Trait
// ================================================================================================

/// 사용자 저장소.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 이메일로 조회 (대소문자 무시).
    async fn find_by_email(&self, email: &str) -> BoardResult<Option<User>>;

    /// ID로 조회.
    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<User>>;

    /// 사용자 생성. 이메일이 이미 있으면 `DuplicateEmail`.
    async fn create(&self, user: NewUser) -> BoardResult<User>;

    /// 프로필 수정. 사용자가 없으면 None.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> BoardResult<Option<User>>;
}

// ================================================================================================
// Types
// ================================================================================================

/// users 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    #[sqlx(default)]
    phone_number: Option<String>,
    #[sqlx(default)]
    school: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = BoardError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&record.role).ok_or_else(|| {
            BoardError::CorruptRecord(format!("user {} has role '{}'", record.id, record.role))
        })?;

        Ok(User {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            password_hash: record.password_hash,
            phone_number: record.phone_number,
            school: record.school,
            role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, phone_number, \
                            school, role, created_at, updated_at";

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> BoardResult<Option<User>> {
        let email = careerlaunch_core::normalize_email(email);
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> BoardResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(User::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> BoardResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash,
                               phone_number, school, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(careerlaunch_core::normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(&user.school)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_or(e, BoardError::DuplicateEmail))?;

        User::try_from(record)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> BoardResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                school = COALESCE($5, school),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone_number)
        .bind(&update.school)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            phone_number: None,
            school: Some("MIT".to_string()),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_record_conversion() {
        let user = User::try_from(record("recruiter")).unwrap();
        assert_eq!(user.role, Role::Recruiter);
        assert_eq!(user.school.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_record_with_unknown_role_is_corrupt() {
        let result = User::try_from(record("admin"));
        assert!(matches!(result, Err(BoardError::CorruptRecord(_))));
    }
}
