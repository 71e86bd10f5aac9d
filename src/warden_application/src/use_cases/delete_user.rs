use warden_core::{
    Action, Forbidden, Identity, Role, UserId, UserStore, UserStoreError, can_perform,
};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum DeleteUserError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error("Cannot delete the last admin")]
    LastAdmin,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
}

impl ClassifyError for DeleteUserError {
    fn kind(&self) -> ErrorKind {
        match self {
            DeleteUserError::Forbidden(_) => ErrorKind::Forbidden,
            DeleteUserError::LastAdmin => ErrorKind::Conflict,
            DeleteUserError::UserStoreError(e) => e.kind(),
        }
    }
}

pub struct DeleteUserUseCase<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> DeleteUserUseCase<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    /// Soft-deletes `target_id`. Owners may delete themselves; admins may
    /// delete anyone except the last remaining admin.
    #[tracing::instrument(
        name = "DeleteUserUseCase::execute",
        skip(self),
        fields(actor_id = %actor.user_id, target_id = %target_id)
    )]
    pub async fn execute(&self, actor: Identity, target_id: UserId) -> Result<(), DeleteUserError> {
        can_perform(
            actor.role,
            Action::DeleteAccount {
                is_owner: actor.user_id == target_id,
            },
            None,
        )?;

        let target = self.user_store.find_by_id(target_id).await?;

        if target.role() == Role::Admin && self.user_store.count_admins().await? <= 1 {
            return Err(DeleteUserError::LastAdmin);
        }

        self.user_store.delete(target_id).await?;

        tracing::info!("User deleted");

        Ok(())
    }
}
