use chrono::Utc;
use warden_core::{ActionTokenStore, ActionTokenStoreError, ActionType, UserStore, UserStoreError};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum ConfirmAccountUserError {
    #[error("Action token store error: {0}")]
    ActionTokenStoreError(#[from] ActionTokenStoreError),
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
}

impl ClassifyError for ConfirmAccountUserError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfirmAccountUserError::ActionTokenStoreError(e) => e.kind(),
            ConfirmAccountUserError::UserStoreError(e) => e.kind(),
        }
    }
}

pub struct ConfirmAccountUserUseCase<U, A>
where
    U: UserStore,
    A: ActionTokenStore,
{
    user_store: U,
    token_store: A,
}

impl<U, A> ConfirmAccountUserUseCase<U, A>
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

    #[tracing::instrument(name = "ConfirmAccountUserUseCase::execute", skip(self, token))]
    pub async fn execute(&self, token: &str) -> Result<(), ConfirmAccountUserError> {
        let consumed = self
            .token_store
            .find_and_consume(token, ActionType::AccountVerification)
            .await?;

        let mut user = self.user_store.find_by_id(consumed.user_id).await?;
        if user.is_verified() {
            tracing::debug!(user_id = %user.id(), "Account already verified");
            return Ok(());
        }

        user.mark_as_verified(Utc::now());
        self.user_store.update(&user).await?;

        tracing::info!(user_id = %user.id(), "Account verified");

        Ok(())
    }
}
