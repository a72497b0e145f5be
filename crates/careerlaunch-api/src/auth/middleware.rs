//! Axum용 JWT 인증 추출기.
//!
//! `Authorization: Bearer <token>` 헤더의 Access Token을 검증하고
//! 인증된 사용자 정보를 핸들러에 전달합니다.
//!
//! ```rust,ignore
//! async fn protected_handler(JwtAuth(identity): JwtAuth) -> impl IntoResponse {
//!     format!("Authenticated user: {}", identity.user_id)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use careerlaunch_core::Role;

use super::jwt::AuthenticatedIdentity;
use super::roles::require_role;
use crate::error::ApiError;
use crate::metrics::record_auth_event;
use crate::state::AppState;

/// JWT 인증 추출기.
#[derive(Debug, Clone)]
pub struct JwtAuth(pub AuthenticatedIdentity);

/// Candidate 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct CandidateAuth(pub AuthenticatedIdentity);

/// Recruiter 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct RecruiterAuth(pub AuthenticatedIdentity);

/// Authorization 헤더에서 Bearer 토큰 추출.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // 헤더 누락, 형식 오류, 토큰 검증 실패 모두 같은 응답
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;

        let identity = state.tokens.verify_access_token(token).map_err(|_| {
            record_auth_event("access", "rejected");
            ApiError::Unauthenticated
        })?;

        Ok(JwtAuth(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for CandidateAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let JwtAuth(identity) = JwtAuth::from_request_parts(parts, state).await?;
        require_role(&identity, Role::Candidate)?;
        Ok(CandidateAuth(identity))
    }
}

impl FromRequestParts<Arc<AppState>> for RecruiterAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let JwtAuth(identity) = JwtAuth::from_request_parts(parts, state).await?;
        require_role(&identity, Role::Recruiter)?;
        Ok(RecruiterAuth(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users/me");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&parts_with_header(None)), None);
        assert_eq!(bearer_token(&parts_with_header(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts_with_header(Some("bearer abc"))), None);
        assert_eq!(bearer_token(&parts_with_header(Some("Bearer "))), None);
    }
}
