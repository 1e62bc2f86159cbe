use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{password::PasswordPolicy, providers::AuthProviderId},
    schema::AuthorizationMode,
};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }

    /// Base URL clients use to reach this server.
    pub fn public_url(&self) -> String {
        match self.general.public_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.general.host, self.general.port),
        }
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
    pub public_url: Option<String>,
    /// When set, the client outputs artifact is written here at startup.
    pub outputs_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
            public_url: None,
            outputs_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_idle: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::DEFAULT_DATABASE_URL.to_string(),
            max_connections: defaults::DEFAULT_DB_MAX_CONNECTIONS as u32,
            min_idle: defaults::DEFAULT_DB_MIN_IDLE as u32,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub provider: AuthProviderId,
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_days: i64,
    pub password_policy: PasswordPolicy,
    pub mfa: MfaConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        // Release builds must provide a secret; validation rejects the empty one.
        let jwt_secret = if cfg!(debug_assertions) {
            defaults::DEV_JWT_SECRET.to_string()
        } else {
            String::new()
        };

        Self {
            provider: AuthProviderId::Local,
            jwt_secret,
            access_ttl_secs: defaults::DEFAULT_ACCESS_TTL_SECS as u64,
            refresh_ttl_days: defaults::DEFAULT_REFRESH_TTL_DAYS,
            password_policy: PasswordPolicy::default(),
            mfa: MfaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MfaMode {
    Off,
    Optional,
    Required,
}

impl MfaMode {
    pub fn is_enabled(self) -> bool {
        !matches!(self, MfaMode::Off)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MfaMode::Off => "off",
            MfaMode::Optional => "optional",
            MfaMode::Required => "required",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MfaConfig {
    pub mode: MfaMode,
    pub sms: bool,
    pub code_length: u32,
    pub code_ttl_secs: i64,
    pub max_attempts: i32,
    /// Delivery endpoint for SMS codes; codes are only logged when unset.
    pub sms_webhook_url: Option<String>,
}

impl MfaConfig {
    pub fn sms_enabled(&self) -> bool {
        self.mode.is_enabled() && self.sms
    }
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            mode: MfaMode::Optional,
            sms: true,
            code_length: defaults::DEFAULT_MFA_CODE_LENGTH as u32,
            code_ttl_secs: defaults::DEFAULT_MFA_CODE_TTL_SECS,
            max_attempts: defaults::DEFAULT_MFA_MAX_ATTEMPTS as i32,
            sms_webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub default_authorization_mode: AuthorizationMode,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_authorization_mode: AuthorizationMode::UserPool,
        }
    }
}
