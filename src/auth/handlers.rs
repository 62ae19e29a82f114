use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, MessageResponse},
        extractors::BearerToken,
    },
    error::Result,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth", delete(delete_account))
}

// A missing or unparseable body is validated as if it were `{}`.
fn body_or_empty(body: Option<Json<CredentialsRequest>>) -> CredentialsRequest {
    body.map(|Json(b)| b).unwrap_or_default()
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<CredentialsRequest>>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let tokens = state.auth.register(body_or_empty(body)).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<CredentialsRequest>>,
) -> Result<Json<AuthResponse>> {
    let tokens = state.auth.login(body_or_empty(body)).await?;
    Ok(Json(tokens))
}

#[instrument(skip(state, token))]
pub async fn delete_account(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<MessageResponse>> {
    state.auth.delete_account(token.as_deref()).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}

#[instrument(skip(state, token))]
pub async fn refresh(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<AuthResponse>> {
    let tokens = state.auth.refresh(token.as_deref()).await?;
    Ok(Json(tokens))
}
