use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{SignInOutcome, SignUpRequest, TokenBundle, UserProfile},
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmMfaRequest {
    pub challenge_id: Uuid,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignOutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Revoke every refresh token the account holds.
    #[serde(default)]
    pub global: bool,
}

#[derive(Debug, Deserialize)]
pub struct SmsMfaRequest {
    /// `None` switches SMS verification off.
    #[serde(default)]
    pub phone_number: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/mfa/confirm", post(confirm_mfa))
        .route("/mfa/sms", put(set_sms_mfa))
        .route("/refresh", post(refresh))
        .route("/sign-out", post(sign_out))
        .with_state(state)
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignUpRequest>,
) -> ApiResult<SignInOutcome> {
    let services = state.services();
    let outcome = services.auth(&state.auth_providers).sign_up(&body).await?;
    JsonApiResponse::ok(outcome)
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> ApiResult<SignInOutcome> {
    let services = state.services();
    let outcome = services
        .auth(&state.auth_providers)
        .sign_in(&body.email, &body.password)
        .await?;
    JsonApiResponse::ok(outcome)
}

async fn confirm_mfa(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmMfaRequest>,
) -> ApiResult<TokenBundle> {
    let services = state.services();
    let tokens = services
        .auth(&state.auth_providers)
        .confirm_mfa(&body.challenge_id, &body.code)
        .await?;
    JsonApiResponse::ok(tokens)
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenBundle> {
    let services = state.services();
    let tokens = services
        .auth(&state.auth_providers)
        .refresh(&body.refresh_token)
        .await?;
    JsonApiResponse::ok(tokens)
}

async fn sign_out(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<SignOutRequest>,
) -> ApiResult<()> {
    let services = state.services();
    services
        .auth(&state.auth_providers)
        .sign_out(&claims, body.refresh_token.as_deref(), body.global)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "signed out", ())
}

async fn set_sms_mfa(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<SmsMfaRequest>,
) -> ApiResult<UserProfile> {
    let services = state.services();
    let profile = services
        .auth(&state.auth_providers)
        .set_sms_mfa(&claims, body.phone_number.as_deref())
        .await?;
    JsonApiResponse::ok(profile)
}
