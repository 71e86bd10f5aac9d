use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Lifetime of every single-use action token unless configured otherwise.
pub const DEFAULT_ACTION_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown action type '{0}'")]
pub struct ActionTypeError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    PasswordReset,
    EmailConfirmation,
    AccountVerification,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PasswordReset => "PASSWORD_RESET",
            ActionType::EmailConfirmation => "EMAIL_CONFIRMATION",
            ActionType::AccountVerification => "ACCOUNT_VERIFICATION",
        }
    }
}

impl FromStr for ActionType {
    type Err = ActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSWORD_RESET" => Ok(ActionType::PasswordReset),
            "EMAIL_CONFIRMATION" => Ok(ActionType::EmailConfirmation),
            "ACCOUNT_VERIFICATION" => Ok(ActionType::AccountVerification),
            other => Err(ActionTypeError(other.to_owned())),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-use, time-limited token authorizing one action for one user.
///
/// `payload` carries action-specific data, such as the pending address of an
/// email change.
#[derive(Clone, PartialEq, Eq)]
pub struct ActionToken {
    pub token: String,
    pub user_id: UserId,
    pub action_type: ActionType,
    pub payload: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl ActionToken {
    pub fn new(
        token: String,
        user_id: UserId,
        action_type: ActionType,
        payload: Option<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            token,
            user_id,
            action_type,
            payload,
            expires_at: Utc::now() + ttl,
        }
    }

    /// A token is usable strictly before `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionToken")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("action_type", &self.action_type)
            .field("payload", &self.payload.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
