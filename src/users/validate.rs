use thiserror::Error;

use crate::users::dto::UserPayload;

/// First failed check on a user payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Email is required")]
    MissingEmail,
    #[error("Age must be 1 or older")]
    AgeTooLow,
    #[error("Email is invalid")]
    InvalidEmail,
}

/// Checks run in a fixed order and stop at the first failure, so a payload
/// with several defects always reports the same message.
pub fn validate(payload: &UserPayload) -> Result<(), ValidationError> {
    if payload.username().is_empty() {
        return Err(ValidationError::MissingUsername);
    }
    if payload.email().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if payload.age() < 1 {
        return Err(ValidationError::AgeTooLow);
    }
    if !payload.email().contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(username: &str, email: &str, age: i64) -> UserPayload {
        UserPayload {
            username: Some(username.into()),
            email: Some(email.into()),
            age: Some(age),
            permissions: None,
        }
    }

    #[test]
    fn accepts_complete_payload() {
        assert_eq!(validate(&payload("testuser", "test@example.com", 25)), Ok(()));
    }

    #[test]
    fn rejects_each_defect() {
        let cases = [
            ("missing username", payload("", "test@example.com", 25), ValidationError::MissingUsername),
            ("missing email", payload("testuser", "", 25), ValidationError::MissingEmail),
            ("zero age", payload("testuser", "test@example.com", 0), ValidationError::AgeTooLow),
            ("negative age", payload("testuser", "test@example.com", -4), ValidationError::AgeTooLow),
            ("email without at", payload("testuser", "test", 25), ValidationError::InvalidEmail),
        ];

        for (name, p, want) in cases {
            assert_eq!(validate(&p), Err(want), "{name}");
        }
    }

    #[test]
    fn age_is_checked_before_email_format() {
        let err = validate(&payload("testuser", "no-at-sign", 0)).unwrap_err();
        assert_eq!(err, ValidationError::AgeTooLow);
    }

    #[test]
    fn email_presence_is_checked_before_age() {
        let err = validate(&payload("testuser", "", 0)).unwrap_err();
        assert_eq!(err.to_string(), "Email is required");
    }

    #[test]
    fn username_wins_over_everything() {
        let err = validate(&payload("", "", 0)).unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
    }

    #[test]
    fn absent_fields_count_as_empty() {
        let err = validate(&UserPayload::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingUsername);

        let p = UserPayload {
            age: None,
            ..payload("testuser", "test@example.com", 0)
        };
        assert_eq!(validate(&p), Err(ValidationError::AgeTooLow));
    }

    #[test]
    fn age_of_one_is_enough() {
        assert!(validate(&payload("kid", "kid@example.com", 1)).is_ok());
    }
}
