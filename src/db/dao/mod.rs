pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod mfa_challenge_dao;
pub mod refresh_token_dao;
pub mod todo_dao;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use mfa_challenge_dao::MfaChallengeDao;
pub use refresh_token_dao::RefreshTokenDao;
pub use todo_dao::TodoDao;
pub use user_dao::UserDao;
