use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailTemplate {
    PasswordReset,
    EmailChangeConfirmation,
    AccountVerification,
    SecurityNotification,
    PromotionNotification,
}

impl EmailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::PasswordReset => "password_reset.html",
            EmailTemplate::EmailChangeConfirmation => "email_change_confirmation.html",
            EmailTemplate::AccountVerification => "account_verification.html",
            EmailTemplate::SecurityNotification => "security_notification.html",
            EmailTemplate::PromotionNotification => "promotion_notification.html",
        }
    }
}

impl fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
