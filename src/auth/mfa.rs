//! SMS second factor: one-time codes, phone number handling and delivery.

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;

use crate::error::AppError;

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;
const VISIBLE_PHONE_DIGITS: usize = 4;

pub fn generate_code(length: u32) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Canonical E.164 form: `+` followed by 8 to 15 digits. Spaces, dashes, dots and
/// parentheses are dropped first.
pub fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let digits = compact
        .strip_prefix('+')
        .ok_or_else(|| AppError::bad_request("Phone number must start with +"))?;
    let valid = digits.chars().all(|c| c.is_ascii_digit())
        && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len());
    if !valid {
        return Err(AppError::bad_request(
            "Phone number must be in E.164 format, e.g. +15555550100",
        ));
    }
    Ok(compact)
}

pub fn mask_phone(phone: &str) -> String {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let hidden = digits.len().saturating_sub(VISIBLE_PHONE_DIGITS);
    let masked: String = digits
        .chars()
        .enumerate()
        .map(|(idx, c)| if idx < hidden { '*' } else { c })
        .collect();
    if phone.starts_with('+') {
        format!("+{masked}")
    } else {
        masked
    }
}

pub fn code_message(code: &str) -> String {
    format!("Your verification code is {code}")
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> Result<(), AppError>;
}

/// Development sender: writes the message to the log instead of a carrier.
#[derive(Debug, Default, Clone)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), AppError> {
        tracing::info!(to = %mask_phone(to), %message, "sms delivery (log only)");
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    to: &'a str,
    message: &'a str,
}

/// POSTs `{ "to", "message" }` to a gateway URL.
#[derive(Clone)]
pub struct WebhookSmsSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookSmsSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SmsSender for WebhookSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), AppError> {
        self.client
            .post(&self.url)
            .json(&WebhookPayload { to, message })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| {
                tracing::error!(error = %err, "sms webhook delivery failed");
                AppError::internal("Failed to deliver verification code")
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_code, mask_phone, normalize_phone};

    #[test]
    fn codes_have_requested_length_and_only_digits() {
        for length in [4, 6, 10] {
            let code = generate_code(length);
            assert_eq!(code.len(), length as usize);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn normalizes_formatted_numbers() {
        assert_eq!(
            normalize_phone(" +1 (555) 555-0100 ").expect("should normalize"),
            "+15555550100"
        );
    }

    #[test]
    fn rejects_numbers_outside_e164() {
        for raw in ["5555550100", "+123", "+1555abc0100", "+1234567890123456"] {
            assert!(normalize_phone(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn masks_all_but_last_four_digits() {
        assert_eq!(mask_phone("+15555550100"), "+*******0100");
        assert_eq!(mask_phone("0100"), "0100");
    }
}
