//! Field validators for appointment data
//!
//! Each validator normalizes a raw extracted value or explains why it was
//! rejected. Rejections are ordinary values; the booking flow re-asks.

use std::str::FromStr;

use email_address::EmailAddress;

use concierge_core::{AppointmentField, ValidationError, ValidationResult};

const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long and non-empty.";
const NAME_BAD_CHARS: &str = "Name can only contain letters, spaces, and basic punctuation.";
const PHONE_NOT_DIGITS: &str = "Phone number must contain only digits.";
const PHONE_BAD_LENGTH: &str = "Phone number must be between 10 and 15 digits.";

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

/// Validate a person's name, returning it trimmed
pub fn validate_name(raw: &str) -> ValidationResult {
    let name = raw.trim();
    if name.chars().count() < 2 {
        return Err(ValidationError::new(AppointmentField::Name, NAME_TOO_SHORT));
    }

    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '-' | '\'');
    if !name.chars().all(allowed) {
        return Err(ValidationError::new(AppointmentField::Name, NAME_BAD_CHARS));
    }

    Ok(name.to_string())
}

/// Validate a phone number, returning its bare digits
pub fn validate_phone(raw: &str) -> ValidationResult {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '-' | '+'))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(AppointmentField::Phone, PHONE_NOT_DIGITS));
    }
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::new(AppointmentField::Phone, PHONE_BAD_LENGTH));
    }

    Ok(digits)
}

/// Validate an email address, returning it with the domain lowercased
pub fn validate_email_address(raw: &str) -> ValidationResult {
    let email = EmailAddress::from_str(raw.trim()).map_err(|e| {
        ValidationError::new(AppointmentField::Email, format!("Invalid email format: {}", e))
    })?;

    Ok(format!("{}@{}", email.local_part(), email.domain().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_trimmed() {
        assert_eq!(validate_name("  Jane Doe ").unwrap(), "Jane Doe");
        assert_eq!(validate_name("Mary-Jane O'Neil Jr.").unwrap(), "Mary-Jane O'Neil Jr.");
    }

    #[test]
    fn test_name_too_short() {
        for raw in ["", "   ", "J", " J "] {
            let err = validate_name(raw).unwrap_err();
            assert_eq!(err.field, AppointmentField::Name);
            assert_eq!(err.message, NAME_TOO_SHORT);
        }
    }

    #[test]
    fn test_name_rejects_digits_and_symbols() {
        for raw in ["R2D2", "john@doe", "Jane_Doe"] {
            assert_eq!(validate_name(raw).unwrap_err().message, NAME_BAD_CHARS);
        }
    }

    #[test]
    fn test_phone_strips_formatting() {
        assert_eq!(validate_phone("555-123-4567").unwrap(), "5551234567");
        assert_eq!(validate_phone("+1 (555) 123-4567").unwrap(), "15551234567");
    }

    #[test]
    fn test_phone_non_digits() {
        assert_eq!(validate_phone("555.123.4567").unwrap_err().message, PHONE_NOT_DIGITS);
        assert_eq!(validate_phone("call me").unwrap_err().message, PHONE_NOT_DIGITS);
        assert_eq!(validate_phone("()-").unwrap_err().message, PHONE_NOT_DIGITS);
    }

    #[test]
    fn test_phone_length_bounds() {
        assert_eq!(validate_phone("123456789").unwrap_err().message, PHONE_BAD_LENGTH);
        assert_eq!(validate_phone("1234567890123456").unwrap_err().message, PHONE_BAD_LENGTH);
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("123456789012345").is_ok());
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(
            validate_email_address(" john.doe@Example.COM ").unwrap(),
            "john.doe@example.com"
        );
    }

    #[test]
    fn test_email_invalid() {
        let err = validate_email_address("not-an-email").unwrap_err();
        assert_eq!(err.field, AppointmentField::Email);
        assert!(err.message.starts_with("Invalid email format: "));
    }
}
