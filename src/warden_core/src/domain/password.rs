use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize },
}

/// A clear-text password candidate that satisfies the length policy.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Password {
    type Error = PasswordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Password::try_from(Secret::new(value.to_owned()))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_short_password_is_rejected() {
        assert_eq!(
            Password::try_from("short").unwrap_err(),
            PasswordError::TooShort { min: 8 }
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(Password::try_from("ééééééé").is_err());
        assert!(Password::try_from("éééééééé").is_ok());
    }

    #[quickcheck]
    fn prop_accepts_iff_long_enough(input: String) -> bool {
        let accepted = Password::try_from(input.as_str()).is_ok();
        accepted == (input.chars().count() >= MIN_PASSWORD_LENGTH)
    }
}
