use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Config loaded from `APP_`-prefixed environment variables, `__` separating nested keys
/// (`APP_AUTH__MFA__MODE=required`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    fn load_dotenv() {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();
        let builder = config_rs::Config::builder().add_source(Self::env_source());
        Self::finish(builder)
    }

    /// Builds from defaults plus explicit dotted-key overrides, ignoring the process
    /// environment. Used by tests and embedders.
    fn from_overrides<'a, I>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut builder = config_rs::Config::builder();
        for (key, value) in overrides {
            builder = builder
                .set_override(key, value)
                .with_context(|| format!("invalid config override for {key}"))?;
        }
        Self::finish(builder)
    }

    fn env_source() -> config_rs::Environment {
        config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn finish(
        builder: config_rs::ConfigBuilder<config_rs::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .build()
            .context("failed to read config sources")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
