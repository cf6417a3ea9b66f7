//! Write-boundary validation for user records.
//!
//! Rules run in a fixed order and every failure is collected, so a caller
//! gets the full list of offending fields in one response. Nothing here
//! touches the store: a failed validation means no persistence at all.

use validator::ValidateEmail;

use crate::domain::User;
use crate::error::{DomainError, FieldViolation};

pub const EMAIL_MAX_LEN: usize = 180;
pub const DISPLAY_NAME_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 7;

const PASSWORD_POLICY: &str = "Password must be at least 7 characters long and contain \
     one digit, one uppercase letter and one lowercase letter";

/// Which kind of write is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New record: email and password are required.
    Create,
    /// Existing record: absent fields keep their stored value.
    Update,
}

type Rule = fn(&User, WriteMode) -> Option<FieldViolation>;

const RULES: &[Rule] = &[
    email_rule,
    display_name_rule,
    password_strength_rule,
    password_confirmation_rule,
];

/// Validate a user write, returning every violation in rule order.
pub fn validate_user_write(user: &User, mode: WriteMode) -> Result<(), DomainError> {
    let violations: Vec<FieldViolation> = RULES.iter().filter_map(|rule| rule(user, mode)).collect();

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "User write rejected by validation");
        Err(DomainError::Validation(violations))
    }
}

/// Minimum strength: length, one ASCII uppercase, one ASCII lowercase, one digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn email_rule(user: &User, mode: WriteMode) -> Option<FieldViolation> {
    match user.email.as_deref() {
        None if mode == WriteMode::Create => Some(FieldViolation::new("email", "Email is required")),
        None => None,
        Some(email) if email.chars().count() > EMAIL_MAX_LEN => Some(FieldViolation::new(
            "email",
            format!("Email must be at most {EMAIL_MAX_LEN} characters"),
        )),
        Some(email) if !email.validate_email() => {
            Some(FieldViolation::new("email", "Email must be a valid email address"))
        }
        Some(_) => None,
    }
}

fn display_name_rule(user: &User, _mode: WriteMode) -> Option<FieldViolation> {
    let name = user.display_name.as_deref()?;
    (name.chars().count() > DISPLAY_NAME_MAX_LEN).then(|| {
        FieldViolation::new(
            "displayName",
            format!("Display name must be at most {DISPLAY_NAME_MAX_LEN} characters"),
        )
    })
}

fn password_strength_rule(user: &User, mode: WriteMode) -> Option<FieldViolation> {
    match user.plain_password.as_deref() {
        None | Some("") if mode == WriteMode::Create => {
            Some(FieldViolation::new("password", "Password is required"))
        }
        None | Some("") => None,
        Some(password) if !is_strong_password(password) => {
            Some(FieldViolation::new("password", PASSWORD_POLICY))
        }
        Some(_) => None,
    }
}

fn password_confirmation_rule(user: &User, _mode: WriteMode) -> Option<FieldViolation> {
    let candidate = user.plain_password.as_deref().unwrap_or_default();
    let confirmation = user.password_confirmation.as_deref().unwrap_or_default();

    (candidate != confirmation)
        .then(|| FieldViolation::new("confirmedPassword", "Passwords do not match"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(password: &str, confirmation: &str) -> User {
        User {
            email: Some("jane@example.com".to_string()),
            plain_password: Some(password.to_string()),
            password_confirmation: Some(confirmation.to_string()),
            ..User::new()
        }
    }

    fn fields(err: DomainError) -> Vec<&'static str> {
        match err {
            DomainError::Validation(v) => v.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_strong_password_passes() {
        let user = candidate("Abcdef1", "Abcdef1");
        assert!(validate_user_write(&user, WriteMode::Create).is_ok());
    }

    #[test]
    fn test_password_without_uppercase_is_rejected() {
        let user = candidate("abcdef1", "abcdef1");
        let err = validate_user_write(&user, WriteMode::Create).unwrap_err();
        assert_eq!(fields(err), vec!["password"]);
    }

    #[test]
    fn test_password_strength_rules() {
        assert!(is_strong_password("Abcdef1"));
        assert!(!is_strong_password("Abcde1"));
        assert!(!is_strong_password("ABCDEF1"));
        assert!(!is_strong_password("Abcdefg"));
        assert!(!is_strong_password(""));
    }

    #[test]
    fn test_non_ascii_letters_do_not_count() {
        assert!(!is_strong_password("Ábcdef1"));
        assert!(!is_strong_password("ÀÉÎÕÜ1a"));
        assert!(!is_strong_password("ABCDEF1é"));
        assert!(is_strong_password("Ábcdef1A"));
    }

    #[test]
    fn test_confirmation_mismatch_is_rejected() {
        let user = candidate("Abcdef1", "Abcdef2");
        let err = validate_user_write(&user, WriteMode::Create).unwrap_err();
        assert_eq!(fields(err), vec!["confirmedPassword"]);
    }

    #[test]
    fn test_violations_are_reported_in_rule_order() {
        let user = User {
            email: Some("not-an-email".to_string()),
            plain_password: Some("short".to_string()),
            ..User::new()
        };
        let err = validate_user_write(&user, WriteMode::Create).unwrap_err();
        assert_eq!(fields(err), vec!["email", "password", "confirmedPassword"]);
    }

    #[test]
    fn test_create_requires_email_and_password() {
        let err = validate_user_write(&User::new(), WriteMode::Create).unwrap_err();
        assert_eq!(fields(err), vec!["email", "password"]);
    }

    #[test]
    fn test_update_without_credentials_is_valid() {
        let user = User {
            id: Some(1),
            display_name: Some("Jane".to_string()),
            ..User::new()
        };
        assert!(validate_user_write(&user, WriteMode::Update).is_ok());
    }

    #[test]
    fn test_display_name_length_limit() {
        let user = User {
            id: Some(1),
            display_name: Some("x".repeat(DISPLAY_NAME_MAX_LEN + 1)),
            ..User::new()
        };
        let err = validate_user_write(&user, WriteMode::Update).unwrap_err();
        assert_eq!(fields(err), vec!["displayName"]);
    }
}
