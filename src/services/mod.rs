pub mod auth_service;
pub mod context;
pub mod crud_service;
pub mod todo_service;
pub mod user_service;

pub use context::ServiceContext;
