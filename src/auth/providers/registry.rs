use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{Claims, SignInOutcome, SignUpRequest, TokenBundle, UserProfile},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderId {
    Local,
}

impl AuthProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProviderId::Local => "local",
        }
    }
}

impl std::str::FromStr for AuthProviderId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "local" => Ok(AuthProviderId::Local),
            other => Err(format!("unsupported auth provider: {other}")),
        }
    }
}

/// Identity backend: account creation, the password + SMS sign-in flow and sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn id(&self) -> AuthProviderId;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignInOutcome, AppError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AppError>;
    async fn confirm_mfa(&self, challenge_id: &Uuid, code: &str) -> Result<TokenBundle, AppError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError>;
    async fn sign_out(
        &self,
        claims: &Claims,
        refresh_token: Option<&str>,
        global: bool,
    ) -> Result<(), AppError>;
    async fn set_sms_mfa(
        &self,
        claims: &Claims,
        phone_number: Option<&str>,
    ) -> Result<UserProfile, AppError>;
    async fn verify(&self, access_token: &str) -> Result<Claims, AppError>;
}

#[derive(Clone)]
pub struct AuthProviders {
    active_id: AuthProviderId,
    providers: HashMap<AuthProviderId, Arc<dyn AuthProvider>>,
}

impl AuthProviders {
    pub fn new(active_id: AuthProviderId) -> Self {
        Self {
            active_id,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn AuthProvider>) -> Result<Self, AppError> {
        self.add(provider)?;
        Ok(self)
    }

    pub fn add(&mut self, provider: Arc<dyn AuthProvider>) -> Result<(), AppError> {
        let id = provider.id();
        if self.providers.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "Auth provider already registered: {}",
                id.as_str()
            )));
        }
        self.providers.insert(id, provider);
        Ok(())
    }

    pub fn set_active(&mut self, id: AuthProviderId) -> Result<(), AppError> {
        if !self.providers.contains_key(&id) {
            return Err(Self::not_configured(id));
        }
        self.active_id = id;
        Ok(())
    }

    pub fn active_id(&self) -> AuthProviderId {
        self.active_id
    }

    pub fn active(&self) -> Result<&dyn AuthProvider, AppError> {
        self.providers
            .get(&self.active_id)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| Self::not_configured(self.active_id))
    }

    fn not_configured(id: AuthProviderId) -> AppError {
        AppError::internal(format!("Auth provider not configured: {}", id.as_str()))
    }
}
