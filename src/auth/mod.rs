pub mod bootstrap;
pub mod jwt;
pub mod mfa;
pub mod password;
pub mod providers;
mod types;

pub use types::{Claims, SignInOutcome, SignUpRequest, TokenBundle, UserProfile};
