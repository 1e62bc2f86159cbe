use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    auth::password::PasswordPolicy,
    config::{AppConfig, MfaMode},
    routes::API_PREFIX,
    schema::{self, AuthorizationMode, ModelSpec},
};

pub const OUTPUTS_VERSION: &str = "1";

/// Everything a client needs to talk to this deployment, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOutputs {
    pub version: String,
    pub auth: AuthOutputs,
    pub data: DataOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthOutputs {
    /// Base URL of the auth routes, e.g. `http://127.0.0.1:3000/api/v1/auth`.
    pub endpoint: String,
    pub login_with: Vec<String>,
    pub password_policy: PasswordPolicy,
    pub mfa: MfaOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaOutputs {
    pub mode: MfaMode,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataOutputs {
    pub url: String,
    pub default_authorization_mode: AuthorizationMode,
    pub models: Vec<ModelSpec>,
}

impl ClientOutputs {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let api = format!("{}{API_PREFIX}", cfg.public_url());
        let methods = if cfg.auth.mfa.sms_enabled() {
            vec!["sms".to_string()]
        } else {
            Vec::new()
        };

        Self {
            version: OUTPUTS_VERSION.to_string(),
            auth: AuthOutputs {
                endpoint: format!("{api}/auth"),
                login_with: vec!["email".to_string()],
                password_policy: cfg.auth.password_policy.clone(),
                mfa: MfaOutputs {
                    mode: cfg.auth.mfa.mode,
                    methods,
                },
            },
            data: DataOutputs {
                url: api,
                default_authorization_mode: cfg.data.default_authorization_mode,
                models: schema::models(),
            },
        }
    }

    /// Base API URL (`…/api/v1`) the data client talks to.
    pub fn api_url(&self) -> &str {
        &self.data.url
    }

    pub fn write(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to encode outputs")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write outputs to {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read outputs from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed outputs file {}", path.display()))
    }
}
