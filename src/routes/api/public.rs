use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    outputs::ClientOutputs,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    pub version: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/outputs.json", get(outputs))
        .with_state(state)
}

async fn health() -> ApiResult<Health> {
    JsonApiResponse::ok(Health {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn outputs(State(state): State<Arc<AppState>>) -> ApiResult<ClientOutputs> {
    JsonApiResponse::ok(ClientOutputs::from_config(&state.config))
}
