pub mod error;
pub mod notification_policy;
pub mod notifications;
pub mod token_issuer;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::{ClassifyError, ErrorKind};
pub use notification_policy::NotificationFailurePolicy;
pub use notifications::{EmailMessage, NotificationProcessor};
pub use token_issuer::{ActionTokenIssuer, IssueTokenError};

pub use use_cases::{
    change_password::{ChangePasswordError, ChangePasswordUseCase},
    confirm_account_user::{ConfirmAccountUserError, ConfirmAccountUserUseCase},
    confirm_email_change::{ConfirmEmailChangeError, ConfirmEmailChangeUseCase},
    confirm_password_reset::{ConfirmPasswordResetError, ConfirmPasswordResetUseCase},
    delete_user::{DeleteUserError, DeleteUserUseCase},
    login::{LoginError, LoginResponse, LoginUseCase},
    promote_user::{PromoteUserError, PromoteUserUseCase},
    register_user::{RegisterUserError, RegisterUserUseCase},
    request_account_validation::{
        DEFAULT_RESEND_VERIFICATION_WINDOW, RequestAccountValidationError,
        RequestAccountValidationUseCase,
    },
    request_email_change::{RequestEmailChangeError, RequestEmailChangeUseCase},
    request_password_reset::{RequestPasswordResetError, RequestPasswordResetUseCase},
};
