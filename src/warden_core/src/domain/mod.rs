pub mod action_links;
pub mod action_token;
pub mod authorization;
pub mod email;
pub mod email_template;
pub mod identity;
pub mod jobs;
pub mod password;
pub mod role;
pub mod user;
pub mod user_id;

pub use action_links::ActionLinks;
pub use action_token::{ActionToken, ActionType, ActionTypeError, DEFAULT_ACTION_TOKEN_TTL_MINUTES};
pub use authorization::{Action, Forbidden, can_perform};
pub use email::{Email, EmailError};
pub use email_template::EmailTemplate;
pub use identity::Identity;
pub use jobs::{
    AccountVerificationJobData, EmailChangeConfirmationJobData, NotificationJob,
    PasswordResetJobData, PromotionNotificationJobData, SecurityNotificationJobData,
};
pub use password::{MIN_PASSWORD_LENGTH, Password, PasswordError};
pub use role::{Role, RoleError};
pub use user::{User, UserError, UserRecord};
pub use user_id::UserId;
