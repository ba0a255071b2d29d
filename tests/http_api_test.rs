//! End-to-end tests of the HTTP surface: auth endpoints, bearer tokens on
//! `/graphql`, and the JSON error envelope.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use socialx::auth::tokens::TokenKeys;
use socialx::config::Config;
use socialx::db;
use socialx::feed::SqliteFeedRepository;
use socialx::routes;
use socialx::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt;

// Helper to build the app over a fresh database
fn test_app() -> (Router, TempDir) {
    let tmp = TempDir::new().unwrap();
    let pool = db::create_pool(&tmp.path().join("test.db")).unwrap();
    db::run_migrations(&pool).unwrap();

    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.database.seed_demo_data = false;

    let repo = Arc::new(SqliteFeedRepository::new(pool));
    let tokens = TokenKeys::new(b"http-test-secret", config.auth.token_days);
    let app = routes::app(AppState::new(&config, repo, tokens));
    (app, tmp)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn graphql(query: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn signup_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        post_json(
            "/auth/signup",
            json!({ "username": username, "name": "Test", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post_json("/auth/login", json!({ "username": username, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_returns_public_user() {
    let (app, _tmp) = test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/auth/signup",
            json!({ "username": "carol", "name": "Carol", "password": "pw" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "carol");
    assert_eq!(body["name"], "Carol");
    assert!(body["id"].is_string());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let (app, _tmp) = test_app();
    let request = || {
        post_json(
            "/auth/signup",
            json!({ "username": "carol", "name": "Carol", "password": "pw" }),
        )
    };

    let (status, _) = send(&app, request()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User exists");
}

#[tokio::test]
async fn signup_with_missing_fields_is_rejected() {
    let (app, _tmp) = test_app();

    for payload in [
        json!({ "username": "carol", "password": "pw" }),
        json!({ "username": "", "name": "Carol", "password": "pw" }),
        json!({}),
    ] {
        let (status, body) = send(&app, post_json("/auth/signup", payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "for {}", payload);
        assert_eq!(body["error"], "Missing fields");
    }
}

#[tokio::test]
async fn malformed_json_body_is_missing_fields() {
    let (app, _tmp) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");
}

#[tokio::test]
async fn login_issues_token_and_rejects_bad_credentials() {
    let (app, _tmp) = test_app();
    let token = signup_and_login(&app, "carol").await;
    assert_eq!(token.split('.').count(), 3);

    let (status, body) = send(
        &app,
        post_json("/auth/login", json!({ "username": "carol", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // Unknown users get the same answer as wrong passwords
    let (status, body) = send(
        &app,
        post_json("/auth/login", json!({ "username": "nobody", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn bearer_token_authorizes_mutations() {
    let (app, _tmp) = test_app();
    let token = signup_and_login(&app, "carol").await;

    let (status, body) = send(
        &app,
        graphql(
            r#"mutation { createPost(text: "over http") { text author { username } } }"#,
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["createPost"]["text"], "over http");
    assert_eq!(body["data"]["createPost"]["author"]["username"], "carol");

    let (_, body) = send(&app, graphql("{ posts { text } }", None)).await;
    assert_eq!(body["data"]["posts"][0]["text"], "over http");
}

#[tokio::test]
async fn invalid_token_is_unauthenticated() {
    let (app, _tmp) = test_app();

    let (status, body) = send(
        &app,
        graphql(r#"mutation { createPost(text: "x") { id } }"#, Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

    let (_, body) = send(
        &app,
        graphql(r#"mutation { createPost(text: "x") { id } }"#, None),
    )
    .await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn graphql_get_runs_queries_and_serves_playground() {
    let (app, _tmp) = test_app();

    let request = Request::builder()
        .uri("/graphql?query=%7B%20posts%20%7B%20id%20%7D%20%7D")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["posts"], json!([]));

    let request = Request::builder()
        .uri("/graphql")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn graphql_get_refuses_mutations() {
    let (app, _tmp) = test_app();
    let token = signup_and_login(&app, "carol").await;

    // mutation{createPost(text:"via-get"){id text}}
    let request = Request::builder()
        .uri("/graphql?query=mutation%7BcreatePost(text%3A%22via-get%22)%7Bid%20text%7D%7D")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "POST");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Mutations must be sent with POST");

    // Nothing was written
    let (_, body) = send(&app, graphql("{ posts { id } }", None)).await;
    assert_eq!(body["data"]["posts"], json!([]));
}

#[tokio::test]
async fn malformed_graphql_body_is_json_error() {
    let (app, _tmp) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("application/json"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Invalid GraphQL request" }));
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let (app, _tmp) = test_app();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
