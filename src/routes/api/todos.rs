use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    schema::{CreateTodo, TodoItem, UpdateTodo},
    state::AppState,
};

// Every handler acts for the token's subject; `owner` never comes from the request body.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list).post(create))
        .route("/todos/{id}", get(find).patch(update).delete(remove))
        .with_state(state)
}

async fn list(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<Vec<TodoItem>> {
    let items = state.services().todo().list(&claims.user_id()?).await?;
    JsonApiResponse::ok(items)
}

async fn create(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CreateTodo>,
) -> ApiResult<TodoItem> {
    let item = state
        .services()
        .todo()
        .create(&claims.user_id()?, body)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", item)
}

async fn find(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<TodoItem> {
    let item = state.services().todo().get(&claims.user_id()?, &id).await?;
    JsonApiResponse::ok(item)
}

async fn update(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodo>,
) -> ApiResult<TodoItem> {
    let item = state
        .services()
        .todo()
        .update(&claims.user_id()?, &id, body)
        .await?;
    JsonApiResponse::ok(item)
}

async fn remove(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<TodoItem> {
    let item = state
        .services()
        .todo()
        .delete(&claims.user_id()?, &id)
        .await?;
    JsonApiResponse::ok(item)
}
