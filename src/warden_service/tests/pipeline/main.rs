mod account_validation;
mod containers;
mod email_change;
mod helpers;
mod password_reset;
mod user_management;
