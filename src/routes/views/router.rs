use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::pages;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/sign-in", post(pages::sign_in))
        .route("/sign-up", post(pages::sign_up))
        .route("/mfa", post(pages::confirm_mfa))
        .route("/sign-out", post(pages::sign_out))
        .route("/todos", post(pages::add_todo))
        .route("/todos/{id}/delete", post(pages::delete_todo))
        .with_state(state)
}
