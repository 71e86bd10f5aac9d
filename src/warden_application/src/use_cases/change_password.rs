use warden_core::{
    Identity, Password, PasswordHasher, PasswordHasherError, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};

/// Error types for change password use case
#[derive(Debug, thiserror::Error)]
pub enum ChangePasswordError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
}

impl ClassifyError for ChangePasswordError {
    fn kind(&self) -> ErrorKind {
        match self {
            ChangePasswordError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ChangePasswordError::UserStoreError(e) => e.kind(),
            ChangePasswordError::PasswordHasherError(_) => ErrorKind::Internal,
        }
    }
}

/// Change password use case - replaces the actor's password after re-authentication
pub struct ChangePasswordUseCase<U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    user_store: U,
    password_hasher: H,
}

impl<U, H> ChangePasswordUseCase<U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    pub fn new(user_store: U, password_hasher: H) -> Self {
        Self {
            user_store,
            password_hasher,
        }
    }

    /// Execute the change password use case
    ///
    /// # Arguments
    /// * `actor` - Identity from the caller's session
    /// * `old_password` - The current password, checked before anything changes
    /// * `new_password` - The new password to set
    ///
    /// # Returns
    /// Ok(()) on success, or ChangePasswordError
    #[tracing::instrument(
        name = "ChangePasswordUseCase::execute",
        skip(self, old_password, new_password),
        fields(user_id = %actor.user_id)
    )]
    pub async fn execute(
        &self,
        actor: Identity,
        old_password: Password,
        new_password: Password,
    ) -> Result<(), ChangePasswordError> {
        let mut user = self.user_store.find_by_id(actor.user_id).await?;

        if !self
            .password_hasher
            .compare(user.password_hash(), &old_password)
            .await?
        {
            return Err(ChangePasswordError::InvalidCredentials);
        }

        let new_hash = self.password_hasher.hash(&new_password).await?;
        user.set_password_hash(new_hash);
        self.user_store.update(&user).await?;

        tracing::info!("Password changed");

        Ok(())
    }
}
