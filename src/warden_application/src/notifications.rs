use async_trait::async_trait;
use warden_core::{
    Email, EmailClient, EmailTemplate, NotificationError, NotificationHandler, NotificationJob,
    OutgoingEmail, TemplateContext, TemplateRenderer,
};

/// Template, subject line and variables for one outgoing email.
#[derive(Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub template: EmailTemplate,
    pub subject: &'static str,
    pub context: TemplateContext,
}

impl EmailMessage {
    /// Maps each job variant to what its email needs. Adding a variant fails
    /// to compile until it is handled here.
    pub fn for_job(job: &NotificationJob) -> Self {
        let mut context = TemplateContext::new();
        let (template, subject) = match job {
            NotificationJob::PasswordReset(data) => {
                context.insert("user_name", data.user_name.clone());
                context.insert("reset_link", data.reset_link.clone());
                context.insert("expires_in_minutes", data.expires_in_minutes.to_string());
                (EmailTemplate::PasswordReset, "Reset your password")
            }
            NotificationJob::EmailChangeConfirmation(data) => {
                context.insert("user_name", data.user_name.clone());
                context.insert("confirmation_link", data.confirmation_link.clone());
                context.insert("expires_in_minutes", data.expires_in_minutes.to_string());
                (
                    EmailTemplate::EmailChangeConfirmation,
                    "Confirm your new email address",
                )
            }
            NotificationJob::AccountVerification(data) => {
                context.insert("user_name", data.user_name.clone());
                context.insert("verification_link", data.verification_link.clone());
                context.insert("expires_in_minutes", data.expires_in_minutes.to_string());
                (EmailTemplate::AccountVerification, "Verify your account")
            }
            NotificationJob::SecurityNotification(data) => {
                context.insert("user_name", data.user_name.clone());
                context.insert("message", data.message.clone());
                (
                    EmailTemplate::SecurityNotification,
                    "Security alert for your account",
                )
            }
            NotificationJob::PromotionNotification(data) => {
                context.insert("user_name", data.user_name.clone());
                context.insert("new_role", data.new_role.to_string());
                (EmailTemplate::PromotionNotification, "Your role has changed")
            }
        };

        Self {
            template,
            subject,
            context,
        }
    }
}

/// Worker-side handler: renders the job's template and sends it.
///
/// Sending the same job twice only produces a duplicate email, so redelivery
/// is harmless.
pub struct NotificationProcessor<T, E>
where
    T: TemplateRenderer,
    E: EmailClient,
{
    renderer: T,
    email_client: E,
}

impl<T, E> NotificationProcessor<T, E>
where
    T: TemplateRenderer,
    E: EmailClient,
{
    pub fn new(renderer: T, email_client: E) -> Self {
        Self {
            renderer,
            email_client,
        }
    }
}

#[async_trait]
impl<T, E> NotificationHandler for NotificationProcessor<T, E>
where
    T: TemplateRenderer,
    E: EmailClient,
{
    #[tracing::instrument(
        name = "NotificationProcessor::handle",
        skip(self, job),
        fields(job_type = job.job_type())
    )]
    async fn handle(&self, job: &NotificationJob) -> Result<(), NotificationError> {
        let recipient =
            Email::try_from(job.recipient()).map_err(|_| NotificationError::InvalidRecipient)?;
        let message = EmailMessage::for_job(job);
        let html_body = self.renderer.render(message.template, &message.context)?;

        self.email_client
            .send(&OutgoingEmail {
                recipient,
                subject: message.subject.to_owned(),
                html_body,
                tag: job.job_type(),
            })
            .await?;

        tracing::info!("Notification sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FlatRenderer, RecordingEmailClient};
    use warden_core::{
        EmailDeliveryError, PasswordResetJobData, PromotionNotificationJobData, Role, SecurityNotificationJobData,
    };

    fn reset_job(to: &str) -> NotificationJob {
        NotificationJob::PasswordReset(PasswordResetJobData {
            user_name: "Ann".to_owned(),
            user_email: to.to_owned(),
            reset_link: "https://app.example.com/reset-password?token=abc".to_owned(),
            expires_in_minutes: 30,
        })
    }

    #[tokio::test]
    async fn test_password_reset_job_is_rendered_and_sent() {
        let client = RecordingEmailClient::default();
        let processor = NotificationProcessor::new(FlatRenderer, client.clone());

        processor.handle(&reset_job("ann@example.com")).await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ann@example.com");
        assert_eq!(sent[0].subject, "Reset your password");
        assert_eq!(sent[0].tag, "password_reset");
        assert_eq!(
            sent[0].content,
            "password_reset.html|expires_in_minutes=30|reset_link=https://app.example.com/reset-password?token=abc|user_name=Ann"
        );
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_permanent_failure() {
        let processor = NotificationProcessor::new(FlatRenderer, RecordingEmailClient::default());

        let err = processor.handle(&reset_job("not-an-email")).await.unwrap_err();

        assert!(matches!(err, NotificationError::InvalidRecipient));
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn test_transport_failure_is_retryable() {
        let processor = NotificationProcessor::new(FlatRenderer, RecordingEmailClient::failing());

        let err = processor.handle(&reset_job("ann@example.com")).await.unwrap_err();

        assert!(matches!(err, NotificationError::Delivery(_)));
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn test_provider_rejection_is_permanent_failure() {
        let processor = NotificationProcessor::new(FlatRenderer, RecordingEmailClient::rejecting());

        let err = processor.handle(&reset_job("ann@example.com")).await.unwrap_err();

        assert!(matches!(
            err,
            NotificationError::Delivery(EmailDeliveryError::Rejected { code: 406, .. })
        ));
        assert!(err.is_permanent());
    }

    #[test]
    fn test_each_job_maps_to_its_template() {
        let security = NotificationJob::SecurityNotification(SecurityNotificationJobData {
            user_name: "Ann".to_owned(),
            to_email: "ann@example.com".to_owned(),
            message: "Someone asked to change your email".to_owned(),
        });
        let promotion = NotificationJob::PromotionNotification(PromotionNotificationJobData {
            user_name: "Ann".to_owned(),
            to_email: "ann@example.com".to_owned(),
            new_role: Role::StockPerson,
        });

        let security = EmailMessage::for_job(&security);
        assert_eq!(security.template, EmailTemplate::SecurityNotification);
        assert!(security.context.contains_key("message"));

        let promotion = EmailMessage::for_job(&promotion);
        assert_eq!(promotion.template, EmailTemplate::PromotionNotification);
        assert_eq!(promotion.context["new_role"], "stock_person");
    }
}
