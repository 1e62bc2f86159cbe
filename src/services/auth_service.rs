use uuid::Uuid;

use crate::{
    auth::{Claims, SignInOutcome, SignUpRequest, TokenBundle, UserProfile, providers::AuthProviders},
    error::AppError,
};

/// Routes every auth operation to the active provider.
#[derive(Clone, Copy)]
pub struct AuthService<'a> {
    providers: &'a AuthProviders,
}

impl<'a> AuthService<'a> {
    pub fn new(providers: &'a AuthProviders) -> Self {
        Self { providers }
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignInOutcome, AppError> {
        self.providers.active()?.sign_up(request).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AppError> {
        self.providers.active()?.sign_in(email, password).await
    }

    pub async fn confirm_mfa(
        &self,
        challenge_id: &Uuid,
        code: &str,
    ) -> Result<TokenBundle, AppError> {
        self.providers.active()?.confirm_mfa(challenge_id, code).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        self.providers.active()?.refresh(refresh_token).await
    }

    pub async fn sign_out(
        &self,
        claims: &Claims,
        refresh_token: Option<&str>,
        global: bool,
    ) -> Result<(), AppError> {
        self.providers
            .active()?
            .sign_out(claims, refresh_token, global)
            .await
    }

    pub async fn set_sms_mfa(
        &self,
        claims: &Claims,
        phone_number: Option<&str>,
    ) -> Result<UserProfile, AppError> {
        self.providers
            .active()?
            .set_sms_mfa(claims, phone_number)
            .await
    }

    pub async fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        self.providers.active()?.verify(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::auth::providers::{AuthProvider, AuthProviderId};

    use super::*;

    struct EchoProvider;

    fn bundle(access_token: String) -> TokenBundle {
        TokenBundle {
            access_token,
            refresh_token: "refresh".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 900,
        }
    }

    #[async_trait]
    impl AuthProvider for EchoProvider {
        fn id(&self) -> AuthProviderId {
            AuthProviderId::Local
        }

        async fn sign_up(&self, request: &SignUpRequest) -> Result<SignInOutcome, AppError> {
            Ok(SignInOutcome::SignedIn {
                tokens: bundle(format!("sign-up:{}", request.email)),
            })
        }

        async fn sign_in(&self, email: &str, _password: &str) -> Result<SignInOutcome, AppError> {
            Ok(SignInOutcome::MfaRequired {
                challenge_id: Uuid::nil(),
                destination: format!("sms:{email}"),
            })
        }

        async fn confirm_mfa(&self, _id: &Uuid, code: &str) -> Result<TokenBundle, AppError> {
            Ok(bundle(format!("mfa:{code}")))
        }

        async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
            Ok(bundle(format!("refresh:{refresh_token}")))
        }

        async fn sign_out(
            &self,
            _claims: &Claims,
            _refresh_token: Option<&str>,
            global: bool,
        ) -> Result<(), AppError> {
            if global {
                Ok(())
            } else {
                Err(AppError::bad_request("local only"))
            }
        }

        async fn set_sms_mfa(
            &self,
            claims: &Claims,
            phone_number: Option<&str>,
        ) -> Result<UserProfile, AppError> {
            Ok(UserProfile {
                id: claims.user_id()?,
                email: claims.email.clone(),
                mfa_enabled: phone_number.is_some(),
                phone_number: phone_number.map(str::to_string),
            })
        }

        async fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
            Ok(Claims {
                sub: Uuid::nil().to_string(),
                email: access_token.to_string(),
                iat: 10,
                exp: 100,
            })
        }
    }

    #[tokio::test]
    async fn delegates_to_the_active_provider() {
        let providers = AuthProviders::new(AuthProviderId::Local)
            .with_provider(Arc::new(EchoProvider))
            .expect("provider registration should succeed");
        let service = AuthService::new(&providers);

        let signed_up = service
            .sign_up(&SignUpRequest {
                email: "alice@example.com".to_string(),
                password: "Password1".to_string(),
                phone_number: None,
            })
            .await
            .expect("sign up should succeed");
        assert!(matches!(
            signed_up,
            SignInOutcome::SignedIn { ref tokens } if tokens.access_token == "sign-up:alice@example.com"
        ));

        let challenged = service
            .sign_in("alice@example.com", "Password1")
            .await
            .expect("sign in should succeed");
        assert!(matches!(challenged, SignInOutcome::MfaRequired { .. }));

        let confirmed = service
            .confirm_mfa(&Uuid::nil(), "123456")
            .await
            .expect("confirm should succeed");
        assert_eq!(confirmed.access_token, "mfa:123456");

        let claims = service.verify("alice@example.com").await.expect("verify");
        let profile = service
            .set_sms_mfa(&claims, Some("+15555550100"))
            .await
            .expect("enrol should succeed");
        assert!(profile.mfa_enabled);

        service
            .sign_out(&claims, None, true)
            .await
            .expect("global sign out should succeed");
        assert!(service.sign_out(&claims, None, false).await.is_err());

        let refreshed = service.refresh("r-1").await.expect("refresh");
        assert_eq!(refreshed.access_token, "refresh:r-1");
    }
}
