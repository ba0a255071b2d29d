use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::service::AuthError;
use crate::feed::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(e) => AppError::ServiceUnavailable(e.to_string()),
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::Sql(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(e) => AppError::BadRequest(e.to_string()),
            AuthError::UsernameTaken => AppError::Conflict("User exists".to_string()),
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Repository(e) => e.into(),
            AuthError::Password(e) => AppError::Internal(e.to_string()),
            AuthError::Token(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Duplicate usernames are reported as a plain bad request
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg.clone()),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Database unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection failed".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn response_body(err: AppError) -> serde_json::Value {
        let body = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_credentials_returns_401() {
        assert_eq!(
            response_status(AppError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn bad_request_and_conflict_return_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AppError::Conflict("User exists".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn method_not_allowed_returns_405() {
        assert_eq!(
            response_status(AppError::MethodNotAllowed("Use POST".into())),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn unavailable_returns_503() {
        assert_eq!(
            response_status(AppError::ServiceUnavailable("timed out".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let err = AppError::Internal("no such table: users".into());
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let body = response_body(err).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn invalid_credentials_body() {
        let body = response_body(AppError::InvalidCredentials).await;
        assert_eq!(body, json!({ "error": "Invalid credentials" }));
    }
}
