//! Client side of the app: an auth session, a data client for the `Todo` record type, and
//! the view models the UI renders from. Everything is configured from the outputs artifact.

mod auth;
mod data;
mod view;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{error::AppError, response::JsonApiResponse};

pub use auth::{AuthClient, AuthSession, SignInStep};
pub use data::{HttpTodoClient, TodoClient};
pub use view::{RootScreen, RootView, TodoListView, heading};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            ClientError::NotSignedIn => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        ClientError::Api {
            status: err.status().as_u16(),
            message: err.message().to_string(),
        }
    }
}

/// Unwraps the `{ status, message, data }` envelope, turning error envelopes into
/// `ClientError::Api`.
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<JsonApiResponse<Value>>(&body)
            .map(|envelope| envelope.message)
            .unwrap_or(body);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str::<JsonApiResponse<T>>(&body)
        .map(|envelope| envelope.data)
        .map_err(|err| ClientError::Decode(err.to_string()))
}
