pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todo_app.db?mode=rwc";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;

pub const DEV_JWT_SECRET: &str = "super-secret-change-me";
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

pub const DEFAULT_PASSWORD_MIN_LENGTH: i64 = 8;

pub const DEFAULT_MFA_CODE_LENGTH: i64 = 6;
pub const DEFAULT_MFA_CODE_TTL_SECS: i64 = 180;
pub const DEFAULT_MFA_MAX_ATTEMPTS: i64 = 3;
