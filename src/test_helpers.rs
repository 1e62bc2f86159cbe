use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::{
    auth::{bootstrap::build_providers, mfa::SmsSender},
    config::{AppConfig, EnvConfig},
    db,
    error::AppError,
    routes::router,
    services::ServiceContext,
    state::AppState,
};

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Keeps every SMS instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingSmsSender {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingSmsSender {
    /// `(to, message)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Digits of the most recent verification code.
    pub fn last_code(&self) -> Option<String> {
        self.sent().last().map(|(_, message)| {
            message
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
        })
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), AppError> {
        self.messages
            .lock()
            .map_err(|_| AppError::internal("sms recorder poisoned"))?
            .push((to.to_string(), message.to_string()));
        Ok(())
    }
}

/// Defaults plus a throwaway in-memory sqlite database and a fixed JWT secret.
pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let base = [
        ("database.url", "sqlite::memory:"),
        ("database.max_connections", "1"),
        ("database.min_idle", "1"),
        ("auth.jwt_secret", TEST_JWT_SECRET),
    ];
    AppConfig::from_overrides(base.iter().chain(overrides).copied()).expect("load test config")
}

/// App state over a fresh schema-synced sqlite database.
pub async fn test_state(cfg: AppConfig) -> (Arc<AppState>, Arc<RecordingSmsSender>) {
    let db = db::connect(&cfg.database)
        .await
        .expect("connect to in-memory sqlite");
    let sms = Arc::new(RecordingSmsSender::default());
    let services = ServiceContext::new(&db);
    let providers =
        build_providers(&cfg.auth, &services, sms.clone()).expect("create auth providers");
    (AppState::new(cfg, db, providers), sms)
}

pub async fn test_app(cfg: AppConfig) -> (Router, Arc<AppState>, Arc<RecordingSmsSender>) {
    let (state, sms) = test_state(cfg).await;
    (router(Arc::clone(&state)), state, sms)
}
