//! 역할 기반 접근 제어 (RBAC).
//!
//! 라우트별 역할 검사와 소유자 검사.
//! 소유자 검사는 역할 검사 이후, 리소스 변경 이전에 수행합니다.

use careerlaunch_core::Role;
use uuid::Uuid;

use super::jwt::AuthenticatedIdentity;
use crate::error::ApiError;
use crate::metrics::record_auth_event;

/// 요청자가 지정된 역할인지 확인.
pub fn require_role(identity: &AuthenticatedIdentity, required: Role) -> Result<(), ApiError> {
    if identity.role == required {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        role = %identity.role,
        required = %required,
        "Role check failed"
    );
    record_auth_event("role", "forbidden");
    Err(ApiError::Forbidden(match required {
        Role::Candidate => "Candidate access required",
        Role::Recruiter => "Recruiter access required",
    }
    .to_string()))
}

/// 요청자가 리소스 소유자인지 확인.
pub fn require_owner(identity: &AuthenticatedIdentity, owner_id: Uuid) -> Result<(), ApiError> {
    if identity.user_id == owner_id {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        owner_id = %owner_id,
        "Ownership check failed"
    );
    record_auth_event("ownership", "forbidden");
    Err(ApiError::Forbidden(
        "You do not own this resource".to_string(),
    ))
}
