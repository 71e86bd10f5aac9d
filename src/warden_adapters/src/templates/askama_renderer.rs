use askama::Template;
use warden_core::{EmailTemplate, TemplateContext, TemplateError, TemplateRenderer};

#[derive(Template)]
#[template(path = "emails/password_reset.html")]
struct PasswordResetEmail<'a> {
    user_name: &'a str,
    reset_link: &'a str,
    expires_in_minutes: &'a str,
}

#[derive(Template)]
#[template(path = "emails/email_change_confirmation.html")]
struct EmailChangeConfirmationEmail<'a> {
    user_name: &'a str,
    confirmation_link: &'a str,
    expires_in_minutes: &'a str,
}

#[derive(Template)]
#[template(path = "emails/account_verification.html")]
struct AccountVerificationEmail<'a> {
    user_name: &'a str,
    verification_link: &'a str,
    expires_in_minutes: &'a str,
}

#[derive(Template)]
#[template(path = "emails/security_notification.html")]
struct SecurityNotificationEmail<'a> {
    user_name: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "emails/promotion_notification.html")]
struct PromotionNotificationEmail<'a> {
    user_name: &'a str,
    new_role: &'a str,
}

/// Compiled-in HTML email templates. Every variable is HTML-escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct AskamaTemplateRenderer;

impl AskamaTemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn var<'a>(context: &'a TemplateContext, key: &'static str) -> Result<&'a str, TemplateError> {
    context
        .get(key)
        .map(String::as_str)
        .ok_or(TemplateError::MissingVariable(key))
}

impl TemplateRenderer for AskamaTemplateRenderer {
    fn render(
        &self,
        template: EmailTemplate,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        let user_name = var(context, "user_name")?;

        let rendered = match template {
            EmailTemplate::PasswordReset => PasswordResetEmail {
                user_name,
                reset_link: var(context, "reset_link")?,
                expires_in_minutes: var(context, "expires_in_minutes")?,
            }
            .render(),
            EmailTemplate::EmailChangeConfirmation => EmailChangeConfirmationEmail {
                user_name,
                confirmation_link: var(context, "confirmation_link")?,
                expires_in_minutes: var(context, "expires_in_minutes")?,
            }
            .render(),
            EmailTemplate::AccountVerification => AccountVerificationEmail {
                user_name,
                verification_link: var(context, "verification_link")?,
                expires_in_minutes: var(context, "expires_in_minutes")?,
            }
            .render(),
            EmailTemplate::SecurityNotification => SecurityNotificationEmail {
                user_name,
                message: var(context, "message")?,
            }
            .render(),
            EmailTemplate::PromotionNotification => PromotionNotificationEmail {
                user_name,
                new_role: var(context, "new_role")?,
            }
            .render(),
        };

        rendered.map_err(|e| TemplateError::RenderFailed(e.to_string()))
    }
}
