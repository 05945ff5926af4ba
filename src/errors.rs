use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Message returned for failures whose details must stay server-side.
pub const GENERIC_SERVER_ERROR: &str = "Terjadi kesalahan pada server";

/// Error body shared by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    /// Builds a complete response with the given status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    /// A referenced entity does not exist. Clients see this as a bad request.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    /// Failure with a message that is already safe to show.
    #[error("{0}")]
    InternalError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} tidak valid", field))
                })
            })
            .next()
            .unwrap_or_else(|| "Data tidak valid".to_string());
        ServiceError::ValidationError(message)
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::NotFound(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_)
            | Self::InternalError(_)
            | Self::ExternalServiceError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Infrastructure failures collapse to a generic message.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::ExternalServiceError(_) | Self::Other(_) => {
                GENERIC_SERVER_ERROR.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(request_id = %request_id(), error = ?self, "request failed");
        }
        ErrorResponse::new(self.response_message()).into_response_with(status)
    }
}

/// Request id of the current request, or empty outside of one.
fn request_id() -> String {
    crate::tracing::current_request_id()
        .map(|id| id.0)
        .unwrap_or_default()
}

/// Result extensions for easier error handling
pub trait ResultExt<T> {
    /// Logs the underlying failure and replaces it with an [`ServiceError::InternalError`]
    /// carrying `message`.
    fn or_internal(self, message: &str) -> Result<T, ServiceError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Debug,
{
    fn or_internal(self, message: &str) -> Result<T, ServiceError> {
        self.map_err(|e| {
            error!(request_id = %request_id(), error = ?e, "{}", message);
            ServiceError::InternalError(message.to_string())
        })
    }
}
