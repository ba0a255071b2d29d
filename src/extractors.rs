use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::auth::tokens::TokenRejection;
use crate::auth::Authentication;
use crate::state::AppState;

/// Resolves the bearer token of every request. Never rejects: a missing or
/// bad token yields a context without identity, and the operations that
/// need one refuse on their own.
impl FromRequestParts<AppState> for Authentication {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = match parts.headers.get(header::AUTHORIZATION) {
            None => Authentication::Anonymous,
            Some(value) => match value.to_str() {
                Ok(value) => Authentication::from_header(Some(value), state.auth.tokens()),
                Err(_) => Authentication::Rejected(TokenRejection::Malformed),
            },
        };
        if let Authentication::Rejected(reason) = &auth {
            tracing::debug!("Bearer token not accepted: {}", reason);
        }

        Ok(auth)
    }
}
