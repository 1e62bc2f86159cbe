//! Browser session kept in three cookies: the access token, the refresh token, and the id
//! of a sign-in waiting on its SMS code.

use axum::http::{HeaderMap, HeaderName, header};
use uuid::Uuid;

use crate::{
    auth::{Claims, TokenBundle},
    config::AppConfig,
    state::AppState,
};

pub const ACCESS_COOKIE: &str = "todo_access";
pub const REFRESH_COOKIE: &str = "todo_refresh";
pub const MFA_COOKIE: &str = "todo_mfa";

const REFRESH_SECS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Default, Clone)]
pub struct SessionCookies {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub mfa: Option<String>,
}

impl SessionCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();
        let pairs = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='));

        for (name, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match name.trim() {
                ACCESS_COOKIE => &mut cookies.access,
                REFRESH_COOKIE => &mut cookies.refresh,
                MFA_COOKIE => &mut cookies.mfa,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        cookies
    }

    pub fn pending_challenge(&self) -> Option<Uuid> {
        self.mfa.as_deref().and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

/// `Set-Cookie` headers collected while handling one request.
#[derive(Debug, Default)]
pub struct CookieJar {
    secure: bool,
    headers: Vec<(HeaderName, String)>,
}

impl CookieJar {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            secure: cfg.public_url().starts_with("https://"),
            headers: Vec::new(),
        }
    }

    fn set(&mut self, name: &str, value: &str, max_age_secs: i64) {
        let mut cookie =
            format!("{name}={value}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        self.headers.push((header::SET_COOKIE, cookie));
    }

    fn clear(&mut self, name: &str) {
        self.set(name, "", 0);
    }

    pub fn store_tokens(&mut self, cfg: &AppConfig, tokens: &TokenBundle) {
        let access_ttl = i64::try_from(tokens.expires_in).unwrap_or(i64::MAX);
        self.set(ACCESS_COOKIE, &tokens.access_token, access_ttl);
        self.set(
            REFRESH_COOKIE,
            &tokens.refresh_token,
            cfg.auth.refresh_ttl_days.saturating_mul(REFRESH_SECS_PER_DAY),
        );
        self.clear(MFA_COOKIE);
    }

    pub fn store_challenge(&mut self, cfg: &AppConfig, challenge_id: &Uuid) {
        self.clear(ACCESS_COOKIE);
        self.clear(REFRESH_COOKIE);
        self.set(
            MFA_COOKIE,
            &challenge_id.to_string(),
            cfg.auth.mfa.code_ttl_secs,
        );
    }

    pub fn clear_all(&mut self) {
        self.clear(ACCESS_COOKIE);
        self.clear(REFRESH_COOKIE);
        self.clear(MFA_COOKIE);
    }

    pub fn into_headers(self) -> Vec<(HeaderName, String)> {
        self.headers
    }
}

pub enum BrowserSession {
    Active(Claims),
    SignedOut,
}

/// Validates the access cookie, falling back to the refresh cookie when it has expired.
/// New tokens and stale-cookie removals land in `jar`.
pub async fn resolve(
    state: &AppState,
    cookies: &SessionCookies,
    jar: &mut CookieJar,
) -> BrowserSession {
    let services = state.services();
    let auth = services.auth(&state.auth_providers);

    if let Some(token) = cookies.access.as_deref()
        && let Ok(claims) = auth.verify(token).await
    {
        return BrowserSession::Active(claims);
    }

    let Some(refresh_token) = cookies.refresh.as_deref() else {
        return BrowserSession::SignedOut;
    };

    let refreshed = match auth.refresh(refresh_token).await {
        Ok(tokens) => auth
            .verify(&tokens.access_token)
            .await
            .map(|claims| (tokens, claims)),
        Err(err) => Err(err),
    };
    match refreshed {
        Ok((tokens, claims)) => {
            jar.store_tokens(&state.config, &tokens);
            BrowserSession::Active(claims)
        }
        Err(err) => {
            tracing::debug!(error = %err, "browser session could not be refreshed");
            jar.clear(ACCESS_COOKIE);
            jar.clear(REFRESH_COOKIE);
            BrowserSession::SignedOut
        }
    }
}
