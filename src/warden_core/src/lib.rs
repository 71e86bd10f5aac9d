pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    AccountVerificationJobData, Action, ActionLinks, ActionToken, ActionType, ActionTypeError,
    DEFAULT_ACTION_TOKEN_TTL_MINUTES, Email, EmailChangeConfirmationJobData, EmailError,
    EmailTemplate, Forbidden, Identity, MIN_PASSWORD_LENGTH, NotificationJob, Password,
    PasswordError, PasswordResetJobData, PromotionNotificationJobData, Role, RoleError,
    SecurityNotificationJobData, User, UserError, UserId, UserRecord, can_perform,
};

pub use ports::{
    repositories::{
        ActionTokenStore, ActionTokenStoreError, InvalidTokenReason, UserStore, UserStoreError,
    },
    services::{
        EmailClient, EmailDeliveryError, EnqueueError, JobEnqueuer, NotificationError,
        NotificationHandler, OutgoingEmail, PasswordHasher, PasswordHasherError, RateLimiter, RateLimiterError, SecureTokenGenerator,
        SessionError, SessionManager, SessionToken, TemplateContext, TemplateError,
        TemplateRenderer, TokenGeneratorError,
    },
};
