use auth_service::app::build_app;
use auth_service::config::AppConfig;
use auth_service::AppState;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory store.
#[allow(dead_code)]
pub fn test_app() -> Router {
    build_app(AppState::in_memory(AppConfig::test_default()))
}

/// Router whose access tokens live for `secs` seconds.
#[allow(dead_code)]
pub fn test_app_with_access_ttl(secs: u64) -> Router {
    let mut config = AppConfig::test_default();
    config.jwt.access_ttl_secs = secs;
    build_app(AppState::in_memory(config))
}

/// Sends one request and returns status plus the JSON body (`Null` if empty).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

#[allow(dead_code)]
pub async fn delete_account(app: &Router, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("DELETE").uri("/api/v1/auth");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

/// Registers `email` and returns the access token.
#[allow(dead_code)]
pub async fn register(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["accessToken"].as_str().unwrap().to_string()
}
