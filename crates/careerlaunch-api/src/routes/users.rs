//! 사용자 API 라우트
//!
//! - `GET /users/me` - 내 프로필 조회
//! - `PATCH /users/me` - 내 프로필 수정 (이메일/역할은 변경 불가)

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use careerlaunch_core::{ProfileUpdate, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::JwtAuth;
use crate::error::{optional_trimmed, ApiError, ApiResult};
use crate::state::AppState;

/// 사용자 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// 프로필 수정 요청
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub school: Option<String>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> ApiResult<ProfileUpdate> {
        // 이름은 보내는 경우 비어 있으면 안 됨
        let name = |value: Option<String>, field: &str| match value {
            Some(v) if v.trim().is_empty() => {
                Err(ApiError::validation(format!("{} cannot be blank", field)))
            }
            other => Ok(optional_trimmed(other)),
        };

        let update = ProfileUpdate {
            first_name: name(self.first_name, "firstName")?,
            last_name: name(self.last_name, "lastName")?,
            phone_number: optional_trimmed(self.phone_number),
            school: optional_trimmed(self.school),
        };

        if update.is_empty() {
            return Err(ApiError::validation("No profile fields to update"));
        }
        Ok(update)
    }
}

/// GET /users/me - 내 프로필 조회
async fn get_me(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(UserResponse {
        user: user.profile(),
    }))
}

/// PATCH /users/me - 내 프로필 수정
async fn update_me(
    State(state): State<Arc<AppState>>,
    JwtAuth(identity): JwtAuth,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(request) = payload?;
    let update = request.into_update()?;

    let user = state
        .users
        .update_profile(identity.user_id, update)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = %user.id, "Profile updated");
    Ok(Json(UserResponse {
        user: user.profile(),
    }))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_trims_and_skips_blank_optionals() {
        let update = UpdateProfileRequest {
            first_name: Some(" Grace ".to_string()),
            school: Some("  ".to_string()),
            ..Default::default()
        }
        .into_update()
        .unwrap();

        assert_eq!(update.first_name.as_deref(), Some("Grace"));
        assert!(update.school.is_none());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let result = UpdateProfileRequest {
            last_name: Some("   ".to_string()),
            ..Default::default()
        }
        .into_update();
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_update_rejects_empty_body() {
        let result = UpdateProfileRequest::default().into_update();
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }
}
