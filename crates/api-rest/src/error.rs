//! Handler errors and their envelope responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use filing_core::constants::{FORBIDDEN_CODE, UNAUTHORIZED_CODE};
use filing_core::records::ApiEnvelope;

/// Envelope code for rejected parameters.
pub const VALIDATION_CODE: i32 = 400;
/// Envelope code for business failures.
pub const FAILED_CODE: i32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("暂未登录或token已经过期")]
    Unauthorized,
    #[error("没有相关权限")]
    Forbidden,
    /// Malformed parameters; HTTP 400.
    #[error("{0}")]
    Validation(String),
    /// Refused request answered with HTTP 400 and a failed envelope.
    #[error("{0}")]
    BadRequest(String),
    /// Business failure answered with HTTP 200 and a failed envelope.
    #[error("{0}")]
    Failed(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_CODE),
            Self::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_CODE),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, VALIDATION_CODE),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, FAILED_CODE),
            Self::Failed(_) => (StatusCode::OK, FAILED_CODE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() || code == FAILED_CODE {
            tracing::warn!("request failed: {}", self);
        }
        let body = ApiEnvelope::<()>::failed(code, self.to_string());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;
