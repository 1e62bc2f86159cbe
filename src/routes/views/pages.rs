use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{SignInOutcome, SignUpRequest},
    client::{ClientError, TodoClient, TodoListView, heading},
    error::AppError,
    schema::{CreateTodo, TodoItem, UpdateTodo},
    services::{auth_service::AuthService, todo_service::TodoService},
    state::AppState,
};

use super::session::{self, BrowserSession, CookieJar, SessionCookies};

#[derive(Template)]
#[template(path = "auth.html")]
struct AuthPage {
    error: Option<String>,
    password_hint: String,
    sms_enabled: bool,
}

#[derive(Template)]
#[template(path = "mfa.html")]
struct MfaPage {
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "todos.html")]
struct TodosPage {
    heading: String,
    items: Vec<TodoItem>,
}

type HtmlError = (StatusCode, Html<String>);

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    email: String,
    password: String,
    #[serde(default)]
    phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct MfaForm {
    code: String,
}

#[derive(Debug, Deserialize)]
pub struct NewTodoForm {
    #[serde(default)]
    content: String,
}

/// The to-do list view's data client, answered in-process for the signed-in owner.
struct OwnerTodos {
    todos: TodoService,
    owner: Uuid,
}

#[async_trait]
impl TodoClient for OwnerTodos {
    async fn list(&self) -> Result<Vec<TodoItem>, ClientError> {
        Ok(self.todos.list(&self.owner).await?)
    }

    async fn create(&self, input: &CreateTodo) -> Result<TodoItem, ClientError> {
        Ok(self.todos.create(&self.owner, input.clone()).await?)
    }

    async fn update(&self, id: &Uuid, input: &UpdateTodo) -> Result<TodoItem, ClientError> {
        Ok(self.todos.update(&self.owner, id, input.clone()).await?)
    }

    async fn delete(&self, id: &Uuid) -> Result<TodoItem, ClientError> {
        Ok(self.todos.delete(&self.owner, id).await?)
    }
}

fn list_view(state: &AppState, owner: Uuid) -> TodoListView<OwnerTodos> {
    TodoListView::new(OwnerTodos {
        todos: state.services().todo(),
        owner,
    })
}

fn render(template: &impl Template, status: StatusCode) -> Result<Response, HtmlError> {
    let rendered = template.render().map_err(|err| {
        tracing::error!(error = %err, "failed to render page");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("failed to render page".to_string()),
        )
    })?;
    Ok((status, Html(rendered)).into_response())
}

fn auth_page(state: &AppState, error: Option<&AppError>) -> Result<Response, HtmlError> {
    let policy = &state.config.auth.password_policy;
    let page = AuthPage {
        error: error.map(|err| err.message().to_string()),
        password_hint: format!("Password must contain {}", policy.violations("").join(", ")),
        sms_enabled: state.config.auth.mfa.sms_enabled(),
    };
    render(&page, error.map_or(StatusCode::OK, AppError::status))
}

fn mfa_page(error: Option<&AppError>) -> Result<Response, HtmlError> {
    let page = MfaPage {
        error: error.map(|err| err.message().to_string()),
    };
    render(&page, error.map_or(StatusCode::OK, AppError::status))
}

fn redirect_home(jar: CookieJar) -> Response {
    (AppendHeaders(jar.into_headers()), Redirect::to("/")).into_response()
}

fn with_cookies(jar: CookieJar, page: Response) -> Response {
    (AppendHeaders(jar.into_headers()), page).into_response()
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HtmlError> {
    let cookies = SessionCookies::from_headers(&headers);
    let mut jar = CookieJar::new(&state.config);

    let claims = match session::resolve(&state, &cookies, &mut jar).await {
        BrowserSession::Active(claims) => claims,
        BrowserSession::SignedOut if cookies.pending_challenge().is_some() => {
            return Ok(with_cookies(jar, mfa_page(None)?));
        }
        BrowserSession::SignedOut => return Ok(with_cookies(jar, auth_page(&state, None)?)),
    };

    let owner = match claims.user_id() {
        Ok(owner) => owner,
        Err(_) => {
            jar.clear_all();
            return Ok(with_cookies(jar, auth_page(&state, None)?));
        }
    };

    let mut view = list_view(&state, owner);
    view.fetch().await;
    let page = TodosPage {
        heading: heading(&claims.email),
        items: view.into_items(),
    };
    Ok(with_cookies(jar, render(&page, StatusCode::OK)?))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignInForm>,
) -> Result<Response, HtmlError> {
    let services = state.services();
    let outcome = services
        .auth(&state.auth_providers)
        .sign_in(&form.email, &form.password)
        .await;
    finish_sign_in(&state, outcome)
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignUpForm>,
) -> Result<Response, HtmlError> {
    let phone_number = Some(form.phone_number.trim())
        .filter(|phone| !phone.is_empty())
        .map(str::to_string);
    let request = SignUpRequest {
        email: form.email,
        password: form.password,
        phone_number,
    };
    let services = state.services();
    let outcome = services.auth(&state.auth_providers).sign_up(&request).await;
    finish_sign_in(&state, outcome)
}

fn finish_sign_in(
    state: &AppState,
    outcome: Result<SignInOutcome, AppError>,
) -> Result<Response, HtmlError> {
    let mut jar = CookieJar::new(&state.config);
    match outcome {
        Ok(SignInOutcome::SignedIn { tokens }) => {
            jar.store_tokens(&state.config, &tokens);
            Ok(redirect_home(jar))
        }
        Ok(SignInOutcome::MfaRequired { challenge_id, .. }) => {
            jar.store_challenge(&state.config, &challenge_id);
            Ok(redirect_home(jar))
        }
        Err(err) => auth_page(state, Some(&err)),
    }
}

pub async fn confirm_mfa(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<MfaForm>,
) -> Result<Response, HtmlError> {
    let mut jar = CookieJar::new(&state.config);
    let Some(challenge_id) = SessionCookies::from_headers(&headers).pending_challenge() else {
        return Ok(redirect_home(jar));
    };

    let services = state.services();
    match services
        .auth(&state.auth_providers)
        .confirm_mfa(&challenge_id, form.code.trim())
        .await
    {
        Ok(tokens) => {
            jar.store_tokens(&state.config, &tokens);
            Ok(redirect_home(jar))
        }
        Err(err) => mfa_page(Some(&err)),
    }
}

pub async fn sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let services = state.services();
    let auth = services.auth(&state.auth_providers);

    if let Err(err) = revoke_browser_session(&auth, &cookies).await {
        tracing::warn!(error = %err, "sign out could not revoke the refresh token");
    }

    let mut jar = CookieJar::new(&state.config);
    jar.clear_all();
    redirect_home(jar)
}

/// Revokes the refresh cookie's token server side. Once the access cookie has lapsed the
/// refresh token is rotated first, which yields claims to sign the fresh one out with.
async fn revoke_browser_session(
    auth: &AuthService<'_>,
    cookies: &SessionCookies,
) -> Result<(), AppError> {
    let claims = match cookies.access.as_deref() {
        Some(token) => auth.verify(token).await.ok(),
        None => None,
    };
    if let Some(claims) = claims {
        return auth.sign_out(&claims, cookies.refresh.as_deref(), false).await;
    }

    let Some(refresh_token) = cookies.refresh.as_deref() else {
        return Ok(());
    };
    let tokens = match auth.refresh(refresh_token).await {
        Ok(tokens) => tokens,
        Err(err) => {
            // Unknown, expired or revoked: nothing left to revoke.
            tracing::debug!(error = %err, "refresh cookie already unusable");
            return Ok(());
        }
    };
    let claims = auth.verify(&tokens.access_token).await?;
    auth.sign_out(&claims, Some(&tokens.refresh_token), false).await
}

pub async fn add_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<NewTodoForm>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let mut jar = CookieJar::new(&state.config);

    if let BrowserSession::Active(claims) = session::resolve(&state, &cookies, &mut jar).await
        && let Ok(owner) = claims.user_id()
    {
        let mut view = list_view(&state, owner);
        view.set_input(form.content);
        view.create().await;
    }
    redirect_home(jar)
}

pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let cookies = SessionCookies::from_headers(&headers);
    let mut jar = CookieJar::new(&state.config);

    if let BrowserSession::Active(claims) = session::resolve(&state, &cookies, &mut jar).await
        && let Ok(owner) = claims.user_id()
    {
        list_view(&state, owner).delete(&id).await;
    }
    redirect_home(jar)
}
