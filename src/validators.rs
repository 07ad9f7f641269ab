/// Input validators
///
/// Email format checking for account creation and updates. There is no
/// password policy here: any non-empty secret is accepted and goes straight
/// to the hasher.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // RFC 5322 simplified (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validate and normalize an email address.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() || trimmed.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(trimmed.to_string())
}
