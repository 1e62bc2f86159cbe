pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, DataConfig, DatabaseConfig, GeneralConfig, LoggingConfig, MfaConfig,
    MfaMode,
};
pub use envconfig::EnvConfig;
