use serde::Deserialize;

use super::ActionType;

/// Base URLs of the front-end pages that accept action tokens.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ActionLinks {
    pub password_reset: String,
    pub email_confirmation: String,
    pub account_verification: String,
}

impl ActionLinks {
    pub fn base_for(&self, action_type: ActionType) -> &str {
        match action_type {
            ActionType::PasswordReset => &self.password_reset,
            ActionType::EmailConfirmation => &self.email_confirmation,
            ActionType::AccountVerification => &self.account_verification,
        }
    }

    /// Builds the link a user follows to redeem `token`.
    ///
    /// Tokens are hex encoded, so they are safe to append without escaping.
    pub fn link_for(&self, action_type: ActionType, token: &str) -> String {
        let base = self.base_for(action_type);
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}token={token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> ActionLinks {
        ActionLinks {
            password_reset: "https://app.example.com/reset-password".to_owned(),
            email_confirmation: "https://app.example.com/auth/confirm-email".to_owned(),
            account_verification: "https://app.example.com/verify-account?src=mail".to_owned(),
        }
    }

    #[test]
    fn test_link_appends_token_query() {
        assert_eq!(
            links().link_for(ActionType::PasswordReset, "abc123"),
            "https://app.example.com/reset-password?token=abc123"
        );
    }

    #[test]
    fn test_link_extends_existing_query() {
        assert_eq!(
            links().link_for(ActionType::AccountVerification, "abc123"),
            "https://app.example.com/verify-account?src=mail&token=abc123"
        );
    }
}
