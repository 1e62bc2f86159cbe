use std::sync::Arc;

use tracing::info;

use crate::{config::AuthConfig, error::AppError, services::ServiceContext};

use super::{
    mfa::{LogSmsSender, SmsSender, WebhookSmsSender},
    providers::{AuthProviders, LocalAuthProvider},
};

/// SMS transport picked from config: the webhook when a URL is set, the log otherwise.
pub fn sms_sender(cfg: &AuthConfig) -> Arc<dyn SmsSender> {
    match cfg.mfa.sms_webhook_url.as_deref() {
        Some(url) => {
            info!("sms codes delivered via webhook");
            Arc::new(WebhookSmsSender::new(url))
        }
        None => {
            info!("sms codes are only logged; set APP_AUTH__MFA__SMS_WEBHOOK_URL to deliver them");
            Arc::new(LogSmsSender)
        }
    }
}

pub fn build_providers(
    cfg: &AuthConfig,
    services: &ServiceContext,
    sms: Arc<dyn SmsSender>,
) -> Result<AuthProviders, AppError> {
    let local_provider = LocalAuthProvider::new(
        services.user(),
        services.refresh_token_dao(),
        services.mfa_challenge_dao(),
        cfg.clone(),
        sms,
    );
    let mut providers = AuthProviders::new(cfg.provider).with_provider(Arc::new(local_provider))?;
    providers.set_active(cfg.provider)?;
    Ok(providers)
}

pub fn init_providers(cfg: &AuthConfig, services: &ServiceContext) -> anyhow::Result<AuthProviders> {
    let providers = build_providers(cfg, services, sms_sender(cfg))?;
    info!(
        provider = providers.active_id().as_str(),
        mfa = cfg.mfa.mode.as_str(),
        "auth providers ready"
    );
    Ok(providers)
}
