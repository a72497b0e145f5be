//! 인증 API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /auth/register` - 회원 가입 후 토큰 발급
//! - `POST /auth/login` - 로그인 후 토큰 발급
//! - `POST /auth/refresh` - Refresh Token으로 Access Token 재발급

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use careerlaunch_core::{normalize_email, NewUser, Role, User, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::auth::{JwtError, TokenPair};
use crate::error::{optional_trimmed, ApiError, ApiResult, RequiredFields};
use crate::metrics::record_auth_event;
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 회원 가입 요청
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub school: Option<String>,
    /// "candidate" (기본값) 또는 "recruiter"
    pub role: Option<String>,
}

/// 로그인 요청
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 토큰 갱신 요청
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// 가입/로그인 응답
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// 토큰 갱신 응답
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

// ================================================================================================
// Validation
// ================================================================================================

/// 검증을 통과한 가입 정보 (비밀번호는 아직 평문).
#[derive(Debug)]
struct Registration {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone_number: Option<String>,
    school: Option<String>,
    role: Role,
}

impl RegisterRequest {
    /// 필수 필드 → 이메일 형식 → 역할 순서로 검증.
    fn validate(self) -> ApiResult<Registration> {
        let mut required = RequiredFields::new();
        let first_name = required.take("firstName", self.first_name);
        let last_name = required.take("lastName", self.last_name);
        let email = required.take("email", self.email);
        let password = required.take_raw("password", self.password);
        required.finish()?;

        let email = normalize_email(&email);
        if !email.validate_email() {
            return Err(ApiError::validation("Invalid email format"));
        }

        let role = match optional_trimmed(self.role) {
            None => Role::default(),
            Some(raw) => Role::parse(&raw)
                .ok_or_else(|| ApiError::validation("Role must be candidate or recruiter"))?,
        };

        Ok(Registration {
            first_name,
            last_name,
            email,
            password,
            phone_number: optional_trimmed(self.phone_number),
            school: optional_trimmed(self.school),
            role,
        })
    }
}

fn auth_response(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    Ok(AuthResponse {
        user: user.profile(),
        tokens: state.tokens.issue_token_pair(user)?,
    })
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /auth/register - 회원 가입
async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let registration = request.validate()?;

    // 사전 검사는 빠른 실패용이며, 최종 판정은 저장소의 유일성 제약
    if state.users.find_by_email(&registration.email).await?.is_some() {
        record_auth_event("register", "duplicate");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = state.hasher.hash(&registration.password).await?;

    let user = state
        .users
        .create(NewUser {
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_hash,
            phone_number: registration.phone_number,
            school: registration.school,
            role: registration.role,
        })
        .await
        .inspect_err(|e| {
            if e.is_conflict() {
                record_auth_event("register", "duplicate");
            }
        })?;

    info!(user_id = %user.id, role = %user.role, "User registered");
    record_auth_event("register", "success");

    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// POST /auth/login - 로그인
///
/// 이메일이 없을 때와 비밀번호가 틀렸을 때 같은 응답을 반환하며,
/// 두 경우 모두 bcrypt 검증을 한 번 수행합니다.
async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;

    let mut required = RequiredFields::new();
    let email = required.take("email", request.email);
    let password = required.take_raw("password", request.password);
    required.finish()?;

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            state.hasher.verify_dummy(&password).await;
            warn!("Login failed");
            record_auth_event("login", "failure");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if state
        .hasher
        .verify(&password, &user.password_hash)
        .await
        .is_err()
    {
        warn!(user_id = %user.id, "Login failed");
        record_auth_event("login", "failure");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, role = %user.role, "User logged in");
    record_auth_event("login", "success");

    Ok(Json(auth_response(&state, &user)?))
}

/// POST /auth/refresh - Access Token 재발급
///
/// Refresh Token은 교체되지 않습니다.
async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(request) = payload?;

    let mut required = RequiredFields::new();
    let refresh_token = required.take("refreshToken", request.refresh_token);
    required.finish()?;

    let access_token = state
        .tokens
        .refresh(&refresh_token, state.users.as_ref())
        .await
        .map_err(|e| match e {
            JwtError::InvalidToken => {
                warn!("Refresh token rejected");
                record_auth_event("refresh", "failure");
                ApiError::InvalidRefreshToken
            }
            other => other.into(),
        })?;

    record_auth_event("refresh", "success");
    Ok(Json(RefreshResponse { access_token }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("  Ada@Example.COM ".to_string()),
            password: Some(" secret1 ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_validation_normalizes() {
        let registration = full_request().validate().unwrap();
        assert_eq!(registration.email, "ada@example.com");
        assert_eq!(registration.password, " secret1 ");
        assert_eq!(registration.role, Role::Candidate);
        assert!(registration.school.is_none());
    }

    #[test]
    fn test_register_validation_lists_all_missing_fields() {
        let request = RegisterRequest {
            first_name: Some("  ".to_string()),
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        match request.validate() {
            Err(ApiError::Validation { missing, .. }) => {
                assert_eq!(missing, vec!["firstName", "lastName", "password"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_register_validation_rejects_bad_email_and_role() {
        let mut request = full_request();
        request.email = Some("not-an-email".to_string());
        assert!(matches!(request.validate(), Err(ApiError::Validation { .. })));

        let mut request = full_request();
        request.role = Some("admin".to_string());
        assert!(matches!(request.validate(), Err(ApiError::Validation { .. })));

        let mut request = full_request();
        request.role = Some("Recruiter".to_string());
        assert_eq!(request.validate().unwrap().role, Role::Recruiter);
    }
}
