use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// -- Request/Response types --

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        tracing::warn!("Rejected request body: {}", e);
        AppError::BadRequest("Missing fields".into())
    })
}

// -- Handlers --

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<Response> {
    let req = parse_body(payload)?;
    let username = req.username.unwrap_or_default();
    tracing::info!(username = %username, "Signup request received");

    let user = state
        .auth
        .signup(
            &username,
            req.name.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await
        .inspect_err(|e| tracing::warn!(username = %username, "Signup failed: {}", e))?;

    tracing::info!(user_id = %user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Response> {
    let req = parse_body(payload)?;
    let username = req.username.unwrap_or_default();
    tracing::info!(username = %username, "Login request received");

    let token = state
        .auth
        .login(&username, req.password.as_deref().unwrap_or_default())
        .await
        .inspect_err(|e| tracing::warn!(username = %username, "Login failed: {}", e))?;

    tracing::info!(username = %username, "Authentication successful");
    Ok((StatusCode::OK, Json(LoginResponse { token })).into_response())
}
