pub mod auth;
pub mod graphql;
pub mod health;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    // Bearer tokens travel in a header, so any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(auth::router())
        .merge(graphql::router())
        .merge(health::router())
        .fallback(|| async { AppError::NotFound })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
