use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::row::{ValidationFailure, VALIDATION_FAILURE_STATUS};
use thiserror::Error;

/// Errors of the API endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Reported to the grid as a warning card, not as a failed request
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownTable(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::from_u16(VALIDATION_FAILURE_STATUS)
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(error_msg) => {
                tracing::warn!("Validation failed: {}", error_msg);
                (status, Json(ValidationFailure { error_msg })).into_response()
            }
            ApiError::Unauthorized(reason) => {
                tracing::debug!("Rejected request: {}", reason);
                (status, "unauthorized").into_response()
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (status, "internal server error").into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (status, "internal server error").into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
