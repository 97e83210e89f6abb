use crate::errors::MessagingError;
use crate::services::send_pipeline::classify_send_error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        match &err {
            MessagingError::Validation(msg) => ApiError::BadRequest(msg.clone()),
            MessagingError::DuplicateName(name) => {
                ApiError::Conflict(format!("Template '{}' already exists", name))
            }
            MessagingError::NotFound(msg) => ApiError::NotFound(msg.clone()),
            MessagingError::Status { .. } => ApiError::Conflict(classify_send_error(&err)),
            MessagingError::Network(_) => ApiError::BadGateway(classify_send_error(&err)),
            MessagingError::Provider { .. } => ApiError::BadGateway(classify_send_error(&err)),
            MessagingError::Config(e) => ApiError::Internal(e.to_string()),
            MessagingError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
            MessagingError::Internal(msg) => ApiError::Internal(msg.clone()),
        }
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    ApiError::Conflict("Name already exists".to_string())
                } else {
                    ApiError::Internal(format!("Database error: {}", message))
                }
            }
            _ => ApiError::Internal("Internal server error".to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
