use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    }

    if cfg.database.min_idle > cfg.database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            cfg.database.min_idle, cfg.database.max_connections
        ));
    }

    let auth = &cfg.auth;
    if auth.jwt_secret.trim().is_empty() {
        errors.push("auth.jwt_secret must not be empty".to_string());
    }

    if auth.access_ttl_secs == 0 {
        errors.push("auth.access_ttl_secs must be > 0".to_string());
    }

    if auth.refresh_ttl_days <= 0 {
        errors.push("auth.refresh_ttl_days must be > 0".to_string());
    }

    if auth.password_policy.min_length < 6 {
        errors.push("auth.password_policy.min_length must be at least 6".to_string());
    }

    let mfa = &auth.mfa;
    if mfa.mode.is_enabled() && !mfa.sms {
        errors.push("auth.mfa requires at least one delivery channel (sms)".to_string());
    }

    if !(4..=10).contains(&mfa.code_length) {
        errors.push("auth.mfa.code_length must be between 4 and 10".to_string());
    }

    if mfa.code_ttl_secs <= 0 {
        errors.push("auth.mfa.code_ttl_secs must be > 0".to_string());
    }

    if mfa.max_attempts <= 0 {
        errors.push("auth.mfa.max_attempts must be > 0".to_string());
    }

    if let Some(url) = mfa.sms_webhook_url.as_deref()
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push("auth.mfa.sms_webhook_url must be an http(s) url".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
