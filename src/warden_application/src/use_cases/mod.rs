pub mod change_password;
pub mod confirm_account_user;
pub mod confirm_email_change;
pub mod confirm_password_reset;
pub mod delete_user;
pub mod login;
pub mod promote_user;
pub mod register_user;
pub mod request_account_validation;
pub mod request_email_change;
pub mod request_password_reset;
