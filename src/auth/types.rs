use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{db::entities::user, error::AppError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("Invalid token subject"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Result of a password sign-in: either a finished session or a pending SMS challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "next_step", rename_all = "snake_case")]
pub enum SignInOutcome {
    SignedIn { tokens: TokenBundle },
    MfaRequired { challenge_id: Uuid, destination: String },
}

/// Account data safe to hand to the owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub mfa_enabled: bool,
    pub phone_number: Option<String>,
}

impl From<&user::Model> for UserProfile {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            mfa_enabled: user.mfa_enabled,
            phone_number: user.phone_number.as_deref().map(super::mfa::mask_phone),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::{Claims, SignInOutcome};

    #[test]
    fn claims_subject_must_be_a_uuid() {
        let id = Uuid::new_v4();
        let mut claims = Claims {
            sub: id.to_string(),
            email: "alice@example.com".to_string(),
            iat: 0,
            exp: 60,
        };
        assert_eq!(claims.user_id().expect("subject should parse"), id);

        claims.sub = "alice".to_string();
        let err = claims.user_id().expect_err("subject should not parse");
        assert_eq!(err.message(), "Invalid token subject");
    }

    #[test]
    fn sign_in_outcome_is_tagged_by_next_step() {
        let challenge_id = Uuid::nil();
        let value = serde_json::to_value(SignInOutcome::MfaRequired {
            challenge_id,
            destination: "+*******0100".to_string(),
        })
        .expect("outcome should serialize");

        assert_eq!(
            value,
            json!({
                "next_step": "mfa_required",
                "challenge_id": challenge_id,
                "destination": "+*******0100",
            })
        );
    }
}
