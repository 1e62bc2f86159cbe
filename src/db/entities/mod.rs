#[allow(unused_imports)]
pub mod prelude {
    pub use super::mfa_challenge::Entity as MfaChallenge;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::todo::Entity as Todo;
    pub use super::user::Entity as User;
}

pub mod mfa_challenge;
pub mod refresh_token;
pub mod todo;
pub mod user;
