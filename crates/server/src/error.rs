use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::DbErr;
use serde_json::json;
use thiserror::Error;
use utils_jwt::JwtError;

use crate::password::PasswordError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status plus the message exposed to the client. Internal failure
    /// details stay in the logs.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Database(DbErr::RecordNotFound(msg)) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            ApiError::Database(_) | ApiError::Jwt(_) | ApiError::Password(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_404_with_its_message() {
        let err = ApiError::Database(DbErr::RecordNotFound("Task not found".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Task not found");
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = ApiError::Database(DbErr::Custom("syntax error near SELECT".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::BadRequest("User already exists".to_string());
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "User already exists");
    }
}
