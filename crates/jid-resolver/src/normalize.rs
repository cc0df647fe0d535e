//! Phone number normalization and the forward (number to JID) helpers.

use crate::error::ResolveError;
use crate::jid::USER_SERVER;

/// Channel prefix used on addresses routed through the WhatsApp provider.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Canonicalizes free-form phone numbers to E.164.
pub trait PhoneNormalizer: Send + Sync {
    /// Normalize `number` to `+` followed by digits.
    fn normalize(&self, number: &str) -> Result<String, ResolveError>;
}

/// Default E.164 normalizer.
///
/// Accepts 7 to 15 digits. Numbers written without a leading `+` must be long
/// enough to carry a country code.
#[derive(Debug, Clone, Copy, Default)]
pub struct E164Normalizer;

impl PhoneNormalizer for E164Normalizer {
    fn normalize(&self, number: &str) -> Result<String, ResolveError> {
        let trimmed = strip_prefix(number).trim();
        let has_plus = trimmed.starts_with('+');
        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

        let invalid = |reason: &str| -> Result<String, ResolveError> {
            Err(ResolveError::InvalidPhoneNumber(format!(
                "{}: {}",
                reason,
                number.trim()
            )))
        };

        if digits.is_empty() {
            return invalid("must contain at least one digit");
        }

        if digits.len() < 7 {
            return invalid("too short");
        }

        if digits.len() > 15 {
            return invalid("too long");
        }

        if has_plus || digits.len() >= 10 {
            Ok(format!("+{}", digits))
        } else {
            invalid("must include country code")
        }
    }
}

fn strip_prefix(number: &str) -> &str {
    number.strip_prefix(WHATSAPP_PREFIX).unwrap_or(number)
}

/// Prepend the `whatsapp:` channel prefix unless it is already present.
pub fn with_whatsapp_prefix(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

/// Convert a phone number (optionally prefixed) to a user JID.
///
/// Input that already contains `@` is treated as a JID and returned as-is.
pub fn to_whatsapp_jid(
    number: &str,
    normalizer: &dyn PhoneNormalizer,
) -> Result<String, ResolveError> {
    let bare = strip_prefix(number.trim()).trim();
    if bare.contains('@') {
        return Ok(bare.to_string());
    }

    let e164 = normalizer.normalize(bare)?;
    let digits: String = e164.chars().filter(|c| c.is_ascii_digit()).collect();
    Ok(format!("{}@{}", digits, USER_SERVER))
}

/// Whether the allow-list names our own number, i.e. the account is chatting
/// with itself.
pub fn is_self_chat_mode(
    self_e164: Option<&str>,
    allow_from: &[String],
    normalizer: &dyn PhoneNormalizer,
) -> bool {
    let Some(own) = self_e164 else {
        return false;
    };
    let Ok(own) = normalizer.normalize(own) else {
        return false;
    };

    allow_from
        .iter()
        .filter(|entry| entry.as_str() != "*")
        .any(|entry| normalizer.normalize(entry).is_ok_and(|n| n == own))
}
