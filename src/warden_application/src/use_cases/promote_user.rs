use warden_core::{
    Action, Forbidden, Identity, JobEnqueuer, NotificationJob, PromotionNotificationJobData, Role,
    UserId, UserStore, UserStoreError, can_perform,
};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum PromoteUserError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
}

impl ClassifyError for PromoteUserError {
    fn kind(&self) -> ErrorKind {
        match self {
            PromoteUserError::Forbidden(_) => ErrorKind::Forbidden,
            PromoteUserError::UserStoreError(e) => e.kind(),
        }
    }
}

/// Changes another user's role, subject to the authorization matrix.
pub struct PromoteUserUseCase<U, J>
where
    U: UserStore,
    J: JobEnqueuer,
{
    user_store: U,
    job_enqueuer: J,
}

impl<U, J> PromoteUserUseCase<U, J>
where
    U: UserStore,
    J: JobEnqueuer,
{
    pub fn new(user_store: U, job_enqueuer: J) -> Self {
        Self {
            user_store,
            job_enqueuer,
        }
    }

    #[tracing::instrument(
        name = "PromoteUserUseCase::execute",
        skip(self),
        fields(actor_id = %actor.user_id, target_id = %target_id)
    )]
    pub async fn execute(
        &self,
        actor: Identity,
        target_id: UserId,
        new_role: Role,
    ) -> Result<(), PromoteUserError> {
        let mut target = self.user_store.find_by_id(target_id).await?;

        can_perform(
            actor.role,
            Action::ChangeRole { new_role },
            Some(target.role()),
        )?;

        if target.role() == new_role {
            return Ok(());
        }

        target.change_role(new_role);
        self.user_store.update(&target).await?;

        tracing::info!(new_role = %new_role, "User role changed");

        let job = NotificationJob::PromotionNotification(PromotionNotificationJobData {
            user_name: target.name().to_owned(),
            to_email: target.email().as_str().to_owned(),
            new_role,
        });
        if let Err(e) = self.job_enqueuer.enqueue(job).await {
            tracing::warn!(error = %e, "Failed to enqueue promotion notification");
        }

        Ok(())
    }
}
