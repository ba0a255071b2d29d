use async_graphql::{Error, ErrorExtensions};

use crate::feed::{RepositoryError, ValidationError};

/// Errors surfaced to GraphQL clients. Each carries a stable `code` extension.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Post not found")]
    PostNotFound,

    #[error("Service unavailable")]
    Unavailable,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHENTICATED",
            ApiError::Validation(_) => "BAD_USER_INPUT",
            ApiError::PostNotFound => "NOT_FOUND",
            ApiError::Unavailable => "SERVICE_UNAVAILABLE",
            ApiError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let code = self.code();
        Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Repository error in resolver: {}", err);
        match err {
            RepositoryError::Unavailable(_) => ApiError::Unavailable,
            RepositoryError::Sql(_) | RepositoryError::Conflict(_) => ApiError::Internal,
        }
    }
}

/// Convert a fallible result into a GraphQL result carrying the error code.
///
/// Plain `?` would go through `Display` and drop the extensions.
pub trait ResultExt<T> {
    fn or_api_error(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<ApiError>> ResultExt<T> for Result<T, E> {
    fn or_api_error(self) -> async_graphql::Result<T> {
        self.map_err(|e| {
            let err: ApiError = e.into();
            err.extend()
        })
    }
}
