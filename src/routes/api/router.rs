use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, me, public, todos};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router(state.clone()))
        .nest("/auth", auth::router(state.clone()))
        .merge(me::router(state.clone()))
        .merge(todos::router(state))
}
