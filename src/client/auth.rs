use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{SignInOutcome, SignUpRequest, TokenBundle, UserProfile},
    outputs::ClientOutputs,
};

use super::{ClientError, read_envelope};

// Refresh a little before the server would start rejecting the token.
const EXPIRY_SKEW_SECS: i64 = 30;

/// What the caller has to do after submitting credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInStep {
    Done,
    /// A code went out by SMS to the masked `destination`; finish with `confirm_sign_in`.
    ConfirmSms { destination: String },
}

/// The signed-in identity a view can render and end.
#[async_trait]
pub trait AuthSession: Send + Sync {
    async fn current_user(&self) -> Result<UserProfile, ClientError>;
    async fn sign_out(&self, global: bool) -> Result<(), ClientError>;
}

struct Session {
    tokens: TokenBundle,
    expires_at: i64,
    user: Option<UserProfile>,
}

impl Session {
    fn new(tokens: TokenBundle) -> Self {
        let ttl = i64::try_from(tokens.expires_in).unwrap_or(i64::MAX);
        Self {
            expires_at: Utc::now().timestamp().saturating_add(ttl),
            tokens,
            user: None,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now().timestamp() + EXPIRY_SKEW_SECS >= self.expires_at
    }
}

#[derive(Default)]
struct AuthState {
    session: Option<Session>,
    pending_challenge: Option<Uuid>,
}

/// Session holder for the auth API. Clones share one session.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth_url: String,
    api_url: String,
    state: Arc<Mutex<AuthState>>,
}

impl AuthClient {
    pub fn new(outputs: &ClientOutputs) -> Self {
        Self::with_http(reqwest::Client::new(), outputs)
    }

    pub fn with_http(http: reqwest::Client, outputs: &ClientOutputs) -> Self {
        Self {
            http,
            auth_url: outputs.auth.endpoint.clone(),
            api_url: outputs.api_url().to_string(),
            state: Arc::new(Mutex::new(AuthState::default())),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignInStep, ClientError> {
        let response = self
            .http
            .post(format!("{}/sign-up", self.auth_url))
            .json(request)
            .send()
            .await?;
        let outcome: SignInOutcome = read_envelope(response).await?;
        Ok(self.apply_outcome(outcome).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInStep, ClientError> {
        let response = self
            .http
            .post(format!("{}/sign-in", self.auth_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let outcome: SignInOutcome = read_envelope(response).await?;
        Ok(self.apply_outcome(outcome).await)
    }

    /// Submits the SMS code for the sign-in started last.
    pub async fn confirm_sign_in(&self, code: &str) -> Result<(), ClientError> {
        let challenge_id = self
            .state
            .lock()
            .await
            .pending_challenge
            .ok_or(ClientError::NotSignedIn)?;

        let response = self
            .http
            .post(format!("{}/mfa/confirm", self.auth_url))
            .json(&json!({ "challenge_id": challenge_id, "code": code }))
            .send()
            .await?;
        let tokens: TokenBundle = read_envelope(response).await?;

        let mut state = self.state.lock().await;
        state.pending_challenge = None;
        state.session = Some(Session::new(tokens));
        Ok(())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    /// A usable access token, refreshed first when the current one is about to expire.
    /// A rejected refresh ends the local session.
    pub async fn access_token(&self) -> Result<String, ClientError> {
        let mut state = self.state.lock().await;
        let session = state.session.as_ref().ok_or(ClientError::NotSignedIn)?;
        if !session.is_expired() {
            return Ok(session.tokens.access_token.clone());
        }

        match self.refresh_tokens(&session.tokens.refresh_token).await {
            Ok(tokens) => {
                let user = state.session.take().and_then(|old| old.user);
                let access_token = tokens.access_token.clone();
                state.session = Some(Session {
                    user,
                    ..Session::new(tokens)
                });
                Ok(access_token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh rejected; signing out locally");
                state.session = None;
                Err(err)
            }
        }
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenBundle, ClientError> {
        let response = self
            .http
            .post(format!("{}/refresh", self.auth_url))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn apply_outcome(&self, outcome: SignInOutcome) -> SignInStep {
        let mut state = self.state.lock().await;
        match outcome {
            SignInOutcome::SignedIn { tokens } => {
                state.pending_challenge = None;
                state.session = Some(Session::new(tokens));
                SignInStep::Done
            }
            SignInOutcome::MfaRequired {
                challenge_id,
                destination,
            } => {
                state.session = None;
                state.pending_challenge = Some(challenge_id);
                SignInStep::ConfirmSms { destination }
            }
        }
    }
}

#[async_trait]
impl AuthSession for AuthClient {
    /// Profile of the signed-in account, fetched once per session.
    async fn current_user(&self) -> Result<UserProfile, ClientError> {
        if let Some(user) = self
            .state
            .lock()
            .await
            .session
            .as_ref()
            .and_then(|session| session.user.clone())
        {
            return Ok(user);
        }

        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/me", self.api_url))
            .bearer_auth(token)
            .send()
            .await?;
        let user: UserProfile = read_envelope(response).await?;

        if let Some(session) = self.state.lock().await.session.as_mut() {
            session.user = Some(user.clone());
        }
        Ok(user)
    }

    /// Ends the session locally even when the server call fails.
    async fn sign_out(&self, global: bool) -> Result<(), ClientError> {
        let Some(session) = self.state.lock().await.session.take() else {
            return Ok(());
        };
        // An expired access token is refreshed first, so the rotated refresh token gets revoked.
        let tokens = if session.is_expired() {
            self.refresh_tokens(&session.tokens.refresh_token).await?
        } else {
            session.tokens
        };

        let response = self
            .http
            .post(format!("{}/sign-out", self.auth_url))
            .bearer_auth(&tokens.access_token)
            .json(&json!({ "refresh_token": tokens.refresh_token, "global": global }))
            .send()
            .await?;
        read_envelope::<()>(response).await
    }
}
