//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! ```json
//! {
//!   "error": "Missing required fields",
//!   "code": "VALIDATION_ERROR",
//!   "details": { "missing": ["email", "password"] }
//! }
//! ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use careerlaunch_core::BoardError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{JwtError, PasswordError};

/// 운영 모드에서 500 응답에 노출되는 메시지.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 짧은 메시지
    pub error: String,
    /// 에러 코드 (예: "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 추가 상세 정보
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// 500 응답의 내부 메시지.
///
/// 응답 extension으로 전달되며 개발 모드에서만
/// [`crate::middleware::error_detail_layer`]가 본문에 반영합니다.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<&'static str>,
    },
    #[error("Email already in use")]
    DuplicateEmail,
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// 단일 메시지 검증 에러.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// 누락 필드 목록을 담은 검증 에러.
    pub fn missing_fields(missing: Vec<&'static str>) -> Self {
        Self::Validation {
            message: "Missing required fields".to_string(),
            missing,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::InvalidRefreshToken | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 응답 본문 생성. 내부 에러 메시지는 여기서 노출되지 않습니다.
    pub fn to_body(&self) -> ApiErrorResponse {
        match self {
            Self::Validation { message, missing } if !missing.is_empty() => {
                ApiErrorResponse::new(self.code(), message.as_str())
                    .with_details(json!({ "missing": missing }))
            }
            Self::Internal(_) => ApiErrorResponse::new(self.code(), SERVER_ERROR_MESSAGE),
            _ => ApiErrorResponse::new(self.code(), self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.to_body())).into_response();
        if let Self::Internal(detail) = self {
            tracing::error!(error = %detail, "Internal server error");
            response.extensions_mut().insert(InternalErrorDetail(detail));
        }
        response
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::DuplicateEmail => Self::DuplicateEmail,
            BoardError::DuplicateApplication => {
                Self::Conflict("You have already applied to this job".to_string())
            }
            BoardError::NotFound(what) => Self::not_found(&what),
            BoardError::InvalidInput(message) => Self::validation(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken => Self::Unauthenticated,
            JwtError::Store(e) => e.into(),
            JwtError::EncodingError(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 필수 문자열 필드 검사 도우미.
///
/// 공백만 있는 값은 누락으로 취급하며, 누락된 필드를 모두 모아 한 번에 보고합니다.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 값을 trim해서 반환하고, 비어 있으면 누락으로 기록합니다.
    pub fn take(&mut self, name: &'static str, value: Option<String>) -> String {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// 비밀번호처럼 원문을 보존해야 하는 필드. 공백 검사만 하고 값은 그대로 반환합니다.
    pub fn take_raw(&mut self, name: &'static str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    /// 누락된 필드가 있으면 `Validation` 에러.
    pub fn finish(self) -> ApiResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing_fields(self.missing))
        }
    }
}

/// 선택 문자열 필드 정리: trim 후 비어 있으면 None.
pub fn optional_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
