use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        Claims, SignInOutcome, SignUpRequest, TokenBundle, UserProfile,
        jwt::{JwtKeys, decode_token, encode_token, make_access_claims},
        mfa::{SmsSender, code_message, generate_code, mask_phone, normalize_phone},
        password::{hash_secret, verify_secret},
    },
    config::{AuthConfig, MfaMode},
    db::dao::{DaoLayerError, MfaChallengeDao, RefreshTokenDao, user_dao::NewUser},
    db::entities::user,
    error::AppError,
    services::user_service::UserService,
};

use super::{AuthProvider, AuthProviderId};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_CODE: &str = "Invalid verification code";

/// Email + password accounts stored in the app database, with an optional SMS code step.
#[derive(Clone)]
pub struct LocalAuthProvider {
    user_service: UserService,
    refresh_token_dao: RefreshTokenDao,
    mfa_challenge_dao: MfaChallengeDao,
    jwt: JwtKeys,
    cfg: AuthConfig,
    sms: Arc<dyn SmsSender>,
}

impl LocalAuthProvider {
    pub fn new(
        user_service: UserService,
        refresh_token_dao: RefreshTokenDao,
        mfa_challenge_dao: MfaChallengeDao,
        cfg: AuthConfig,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            user_service,
            refresh_token_dao,
            mfa_challenge_dao,
            jwt: JwtKeys::from_secret(cfg.jwt_secret.as_bytes()),
            cfg,
            sms,
        }
    }

    async fn issue_tokens(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(&user.id, &user.email, self.cfg.access_ttl_secs);
        let access_token = encode_token(&self.jwt, &claims)?;

        let refresh = self
            .refresh_token_dao
            .create_refresh_token(&user.id, self.cfg.refresh_ttl_days)
            .await?;

        Ok(TokenBundle {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: self.cfg.access_ttl_secs,
        })
    }

    async fn complete_sign_in(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let now = Utc::now().fixed_offset();
        self.user_service.set_last_login(&user.id, &now).await?;
        self.issue_tokens(user).await
    }

    /// Password already checked: finish now, or park the sign-in behind an SMS code.
    async fn begin_session(&self, user: &user::Model) -> Result<SignInOutcome, AppError> {
        if self.cfg.mfa.sms_enabled()
            && user.mfa_enabled
            && let Some(phone) = user.phone_number.as_deref()
        {
            return self.start_challenge(user, phone).await;
        }

        let tokens = self.complete_sign_in(user).await?;
        Ok(SignInOutcome::SignedIn { tokens })
    }

    async fn start_challenge(
        &self,
        user: &user::Model,
        phone: &str,
    ) -> Result<SignInOutcome, AppError> {
        let code = generate_code(self.cfg.mfa.code_length);
        let code_hash = hash_secret(&code)?;
        let challenge = self
            .mfa_challenge_dao
            .create_challenge(&user.id, &code_hash, self.cfg.mfa.code_ttl_secs)
            .await?;

        self.sms.send(phone, &code_message(&code)).await?;
        info!(user_id = %user.id, challenge_id = %challenge.id, "sms challenge issued");

        Ok(SignInOutcome::MfaRequired {
            challenge_id: challenge.id,
            destination: mask_phone(phone),
        })
    }
}

/// Trimmed, lowercased address with a single `@` and a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::bad_request("Email required"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::bad_request("Invalid email address"));
    }
    Ok(email)
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn id(&self) -> AuthProviderId {
        AuthProviderId::Local
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignInOutcome, AppError> {
        let email = normalize_email(&request.email)?;
        self.cfg.password_policy.validate(&request.password)?;

        let phone = request
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(normalize_phone)
            .transpose()?;
        if self.cfg.mfa.mode == MfaMode::Required && phone.is_none() {
            return Err(AppError::bad_request(
                "Phone number required for SMS verification",
            ));
        }

        if self.user_service.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = hash_secret(&request.password)?;
        let user = self
            .user_service
            .create_user(NewUser {
                email: &email,
                password_hash: &password_hash,
                phone_number: phone.as_deref(),
                mfa_enabled: self.cfg.mfa.sms_enabled() && phone.is_some(),
            })
            .await?;
        info!(user_id = %user.id, mfa = user.mfa_enabled, "user registered");

        self.begin_session(&user).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AppError> {
        let email = email.trim().to_lowercase();
        let user = self
            .user_service
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_secret(password, &user.password_hash)? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        self.begin_session(&user).await
    }

    async fn confirm_mfa(&self, challenge_id: &Uuid, code: &str) -> Result<TokenBundle, AppError> {
        let challenge = self
            .mfa_challenge_dao
            .find_pending(challenge_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CODE))?;

        if challenge.expires_at < Utc::now().fixed_offset() {
            self.mfa_challenge_dao.consume(&challenge.id).await?;
            return Err(AppError::unauthorized("Verification code expired"));
        }

        if !verify_secret(code.trim(), &challenge.code_hash)? {
            match self
                .mfa_challenge_dao
                .record_failed_attempt(&challenge.id, self.cfg.mfa.max_attempts)
                .await
            {
                Ok(attempts) => warn!(
                    challenge_id = %challenge.id,
                    attempts,
                    "wrong verification code"
                ),
                // Closed by a concurrent request; nothing left to count.
                Err(DaoLayerError::NotFound { .. }) => {}
                Err(err) => return Err(err.into()),
            }
            return Err(AppError::unauthorized(INVALID_CODE));
        }

        // Only the request that flips `consumed` gets tokens.
        if !self.mfa_challenge_dao.consume(&challenge.id).await? {
            return Err(AppError::unauthorized(INVALID_CODE));
        }

        let user = self
            .user_service
            .find_by_id(&challenge.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CODE))?;
        self.complete_sign_in(&user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let token = self
            .refresh_token_dao
            .find_active_by_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if token.expires_at < Utc::now().fixed_offset() || token.revoked {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        let user = self
            .user_service
            .find_by_id(&token.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        // A concurrent refresh of the same token already rotated it.
        if !self.refresh_token_dao.revoke_token(refresh_token).await? {
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        self.issue_tokens(&user).await
    }

    async fn sign_out(
        &self,
        claims: &Claims,
        refresh_token: Option<&str>,
        global: bool,
    ) -> Result<(), AppError> {
        let user_id = claims.user_id()?;

        if global {
            let revoked = self.refresh_token_dao.revoke_all_for_user(&user_id).await?;
            info!(%user_id, revoked, "signed out everywhere");
            return Ok(());
        }

        let Some(raw) = refresh_token else {
            return Ok(());
        };
        // Already revoked or unknown tokens make sign-out a no-op.
        let Some(token) = self.refresh_token_dao.find_active_by_token(raw).await? else {
            return Ok(());
        };
        if token.user_id != user_id {
            return Err(AppError::forbidden(
                "Refresh token belongs to another account",
            ));
        }
        self.refresh_token_dao.revoke_token(raw).await?;
        info!(%user_id, "signed out");
        Ok(())
    }

    async fn set_sms_mfa(
        &self,
        claims: &Claims,
        phone_number: Option<&str>,
    ) -> Result<UserProfile, AppError> {
        let user_id = claims.user_id()?;

        let phone = match phone_number {
            Some(raw) => {
                if !self.cfg.mfa.sms_enabled() {
                    return Err(AppError::bad_request("SMS verification is disabled"));
                }
                Some(normalize_phone(raw)?)
            }
            None => {
                if self.cfg.mfa.mode == MfaMode::Required {
                    return Err(AppError::forbidden("SMS verification is required"));
                }
                None
            }
        };

        let user = self.user_service.set_sms_mfa(&user_id, phone).await?;
        info!(%user_id, enabled = user.mfa_enabled, "sms mfa updated");
        Ok(UserProfile::from(&user))
    }

    async fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        decode_token(&self.jwt, access_token)
    }
}
