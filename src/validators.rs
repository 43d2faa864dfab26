/// Request input validators
///
/// Applied by the HTTP handlers before anything reaches the auth core or
/// the store. The auth core itself accepts any password, including empty.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_PASSWORD_LENGTH: usize = 1024; // bounds Argon2 input size

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Rejects empty and oversized passwords. Content is not otherwise restricted.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(is_valid_email("walt@breakingbad.com").unwrap(), "walt@breakingbad.com");
        assert_eq!(is_valid_email("  saul@bettercall.com ").unwrap(), "saul@bettercall.com");
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "   ", "notanemail", "user@", "@example.com", "user@@example.com"] {
            assert!(is_valid_email(email).is_err(), "should reject {:?}", email);
        }
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            is_valid_email(&email),
            Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH))
        );
    }

    #[test]
    fn test_password_rules() {
        assert!(is_valid_password("04234").is_ok());
        assert_eq!(is_valid_password(""), Err(ValidationError::EmptyField("password")));
        assert!(is_valid_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
