//! API error type and its HTTP mapping

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flagkeeper_core::ToggleError;

use crate::handlers::{ApiResponse, ErrorInfo};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// Server-side configuration gap, e.g. a toggle with an unknown type
    Misconfigured(String),
    InternalError(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Misconfigured(_) => "CONFIGURATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Misconfigured(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Misconfigured(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl From<ToggleError> for ApiError {
    fn from(err: ToggleError) -> Self {
        let msg = err.to_string();
        match err {
            ToggleError::NotFound { .. } => ApiError::NotFound(msg),
            ToggleError::NameConflict(_) => ApiError::Conflict(msg),
            ToggleError::InvalidName { .. } => ApiError::BadRequest(msg),
            ToggleError::UnknownFeatureType(_) => ApiError::Misconfigured(msg),
            ToggleError::Store(_) => ApiError::InternalError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self.message(), "Request failed");
        }

        let error_info = ErrorInfo::new(self.error_code(), self.message());
        let response = ApiResponse::<()>::error(error_info, uuid::Uuid::new_v4().to_string());

        (status, Json(response)).into_response()
    }
}
