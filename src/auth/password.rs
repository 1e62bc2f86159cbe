use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::{config::defaults::DEFAULT_PASSWORD_MIN_LENGTH, error::AppError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_numbers: bool,
    pub require_symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_PASSWORD_MIN_LENGTH as usize,
            require_lowercase: true,
            require_uppercase: true,
            require_numbers: true,
            require_symbols: false,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, in a stable order.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if password.chars().count() < self.min_length {
            problems.push(format!("at least {} characters", self.min_length));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            problems.push("a lowercase letter".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            problems.push("an uppercase letter".to_string());
        }
        if self.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("a number".to_string());
        }
        if self.require_symbols && !password.chars().any(|c| c.is_ascii_punctuation()) {
            problems.push("a symbol".to_string());
        }
        problems
    }

    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let problems = self.violations(password);
        if problems.is_empty() {
            return Ok(());
        }
        Err(AppError::bad_request(format!(
            "Password must contain {}",
            problems.join(", ")
        )))
    }
}

/// Salted argon2 hash in PHC string form. Used for passwords and SMS codes.
pub fn hash_secret(secret: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|err| AppError::internal(format!("Hashing failed: {err}")))?
        .to_string();
    Ok(hash)
}

pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::internal(format!("Invalid stored hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
