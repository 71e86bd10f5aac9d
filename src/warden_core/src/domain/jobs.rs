use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetJobData {
    pub user_name: String,
    pub user_email: String,
    pub reset_link: String,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailChangeConfirmationJobData {
    pub user_name: String,
    pub to_email: String,
    pub confirmation_link: String,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountVerificationJobData {
    pub user_name: String,
    pub to_email: String,
    pub verification_link: String,
    pub expires_in_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityNotificationJobData {
    pub user_name: String,
    pub to_email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionNotificationJobData {
    pub user_name: String,
    pub to_email: String,
    pub new_role: Role,
}

/// Every notification the identity pipeline can ask a worker to deliver.
///
/// Serialized as `{"job_type": "...", "payload": {...}}`; the `job_type` tags
/// are stable and shared with already-queued jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job_type", content = "payload")]
pub enum NotificationJob {
    #[serde(rename = "email:password_reset")]
    PasswordReset(PasswordResetJobData),
    #[serde(rename = "email:change_confirmation")]
    EmailChangeConfirmation(EmailChangeConfirmationJobData),
    #[serde(rename = "email:account_verification")]
    AccountVerification(AccountVerificationJobData),
    #[serde(rename = "email:security_notification")]
    SecurityNotification(SecurityNotificationJobData),
    #[serde(rename = "email:promotion_notification")]
    PromotionNotification(PromotionNotificationJobData),
}

impl NotificationJob {
    pub fn job_type(&self) -> &'static str {
        match self {
            NotificationJob::PasswordReset(_) => "email:password_reset",
            NotificationJob::EmailChangeConfirmation(_) => "email:change_confirmation",
            NotificationJob::AccountVerification(_) => "email:account_verification",
            NotificationJob::SecurityNotification(_) => "email:security_notification",
            NotificationJob::PromotionNotification(_) => "email:promotion_notification",
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            NotificationJob::PasswordReset(data) => &data.user_email,
            NotificationJob::EmailChangeConfirmation(data) => &data.to_email,
            NotificationJob::AccountVerification(data) => &data.to_email,
            NotificationJob::SecurityNotification(data) => &data.to_email,
            NotificationJob::PromotionNotification(data) => &data.to_email,
        }
    }
}
