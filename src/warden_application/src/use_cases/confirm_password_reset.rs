use warden_core::{
    ActionTokenStore, ActionTokenStoreError, ActionType, Password, PasswordHasher,
    PasswordHasherError, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum ConfirmPasswordResetError {
    #[error("Action token store error: {0}")]
    ActionTokenStoreError(#[from] ActionTokenStoreError),
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
}

impl ClassifyError for ConfirmPasswordResetError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfirmPasswordResetError::ActionTokenStoreError(e) => e.kind(),
            ConfirmPasswordResetError::UserStoreError(e) => e.kind(),
            ConfirmPasswordResetError::PasswordHasherError(_) => ErrorKind::Internal,
        }
    }
}

pub struct ConfirmPasswordResetUseCase<U, A, H>
where
    U: UserStore,
    A: ActionTokenStore,
    H: PasswordHasher,
{
    user_store: U,
    token_store: A,
    password_hasher: H,
}

impl<U, A, H> ConfirmPasswordResetUseCase<U, A, H>
where
    U: UserStore,
    A: ActionTokenStore,
    H: PasswordHasher,
{
    pub fn new(user_store: U, token_store: A, password_hasher: H) -> Self {
        Self {
            user_store,
            token_store,
            password_hasher,
        }
    }

    /// Consumes a password-reset token and sets `new_password` on its owner.
    ///
    /// The token is burned before the user is touched, so a failed hash or
    /// update still requires a fresh reset request.
    #[tracing::instrument(
        name = "ConfirmPasswordResetUseCase::execute",
        skip(self, token, new_password)
    )]
    pub async fn execute(
        &self,
        token: &str,
        new_password: Password,
    ) -> Result<(), ConfirmPasswordResetError> {
        let consumed = self
            .token_store
            .find_and_consume(token, ActionType::PasswordReset)
            .await?;

        let mut user = self.user_store.find_by_id(consumed.user_id).await?;
        let new_hash = self.password_hasher.hash(&new_password).await?;
        user.set_password_hash(new_hash);
        self.user_store.update(&user).await?;

        tracing::info!(user_id = %user.id(), "Password reset completed");

        Ok(())
    }
}
