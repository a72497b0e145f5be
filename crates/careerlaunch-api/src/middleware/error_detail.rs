//! 500 응답 상세 메시지 middleware.
//!
//! 핸들러는 항상 `"Server error"` 본문을 만들고, 개발 모드에서만
//! 이 레이어가 실제 에러 메시지로 본문을 교체합니다.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use careerlaunch_core::Environment;

use crate::error::{ApiErrorResponse, InternalErrorDetail};

/// 개발 모드에서 500 응답 본문에 내부 에러 메시지를 노출합니다.
pub async fn error_detail_layer(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !environment.is_development() || response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }

    match response.extensions().get::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => {
            let body = ApiErrorResponse::new("INTERNAL_ERROR", detail.as_str());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
        None => response,
    }
}
