use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email can't be empty")]
    Empty,
    #[error("Invalid email address")]
    Invalid,
}

/// A syntactically valid, normalized (trimmed, lowercased) email address.
///
/// The address is kept behind a [`Secret`] so it never shows up in `Debug`
/// output or tracing spans.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl Email {
    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = EmailError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        let normalized = value.expose_secret().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if !EMAIL_PATTERN.is_match(&normalized) {
            return Err(EmailError::Invalid);
        }

        Ok(Self(Secret::new(normalized)))
    }
}

impl TryFrom<&str> for Email {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Email::try_from(Secret::new(value.to_owned()))
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}
