use warden_core::{
    ActionTokenStore, ActionTokenStoreError, ActionType, Email, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum ConfirmEmailChangeError {
    #[error("Email already in use")]
    EmailAlreadyInUse,
    #[error("Email confirmation token carries no valid address")]
    InvalidPayload,
    #[error("Action token store error: {0}")]
    ActionTokenStoreError(#[from] ActionTokenStoreError),
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
}

impl From<UserStoreError> for ConfirmEmailChangeError {
    fn from(error: UserStoreError) -> Self {
        match error {
            UserStoreError::UserAlreadyExists => ConfirmEmailChangeError::EmailAlreadyInUse,
            other => ConfirmEmailChangeError::UserStoreError(other),
        }
    }
}

impl ClassifyError for ConfirmEmailChangeError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfirmEmailChangeError::EmailAlreadyInUse => ErrorKind::Conflict,
            ConfirmEmailChangeError::InvalidPayload => ErrorKind::Internal,
            ConfirmEmailChangeError::ActionTokenStoreError(e) => e.kind(),
            ConfirmEmailChangeError::UserStoreError(e) => e.kind(),
        }
    }
}

pub struct ConfirmEmailChangeUseCase<U, A>
where
    U: UserStore,
    A: ActionTokenStore,
{
    user_store: U,
    token_store: A,
}

impl<U, A> ConfirmEmailChangeUseCase<U, A>
where
    U: UserStore,
    A: ActionTokenStore,
{
    pub fn new(user_store: U, token_store: A) -> Self {
        Self {
            user_store,
            token_store,
        }
    }

    /// Applies the address stored in the token payload. Returns the new email.
    #[tracing::instrument(name = "ConfirmEmailChangeUseCase::execute", skip(self, token))]
    pub async fn execute(&self, token: &str) -> Result<Email, ConfirmEmailChangeError> {
        let consumed = self
            .token_store
            .find_and_consume(token, ActionType::EmailConfirmation)
            .await?;

        let new_email = consumed
            .payload
            .as_deref()
            .and_then(|payload| Email::try_from(payload).ok())
            .ok_or(ConfirmEmailChangeError::InvalidPayload)?;

        let mut user = self.user_store.find_by_id(consumed.user_id).await?;
        user.change_email(new_email.clone());
        self.user_store.update(&user).await?;

        tracing::info!(user_id = %user.id(), "Email change confirmed");

        Ok(new_email)
    }
}
