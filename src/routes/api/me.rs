use std::sync::Arc;

use axum::{Router, extract::State, routing::get};

use crate::{
    auth::UserProfile,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/me", get(me)).with_state(state)
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<UserProfile> {
    let profile = state.services().user().profile(&claims.user_id()?).await?;
    JsonApiResponse::ok(profile)
}
