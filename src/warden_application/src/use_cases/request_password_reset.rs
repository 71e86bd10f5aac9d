use warden_core::{
    ActionLinks, ActionTokenStore, ActionType, Email, EnqueueError, JobEnqueuer, NotificationJob,
    PasswordResetJobData, SecureTokenGenerator, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};
use crate::notification_policy::NotificationFailurePolicy;
use crate::token_issuer::{ActionTokenIssuer, IssueTokenError};

#[derive(Debug, thiserror::Error)]
pub enum RequestPasswordResetError {
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Failed to issue token: {0}")]
    IssueTokenError(#[from] IssueTokenError),
    #[error("Failed to enqueue notification: {0}")]
    EnqueueError(#[from] EnqueueError),
}

impl ClassifyError for RequestPasswordResetError {
    fn kind(&self) -> ErrorKind {
        match self {
            RequestPasswordResetError::UserStoreError(e) => e.kind(),
            RequestPasswordResetError::IssueTokenError(e) => e.kind(),
            RequestPasswordResetError::EnqueueError(_) => ErrorKind::Enqueue,
        }
    }
}

/// Issues a password-reset token and queues the email carrying its link.
pub struct RequestPasswordResetUseCase<U, A, G, J>
where
    U: UserStore,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    user_store: U,
    token_issuer: ActionTokenIssuer<A, G>,
    job_enqueuer: J,
    links: ActionLinks,
    failure_policy: NotificationFailurePolicy,
}

impl<U, A, G, J> RequestPasswordResetUseCase<U, A, G, J>
where
    U: UserStore,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    pub fn new(
        user_store: U,
        token_issuer: ActionTokenIssuer<A, G>,
        job_enqueuer: J,
        links: ActionLinks,
        failure_policy: NotificationFailurePolicy,
    ) -> Self {
        Self {
            user_store,
            token_issuer,
            job_enqueuer,
            links,
            failure_policy,
        }
    }

    /// Unknown addresses succeed without creating anything, so callers cannot
    /// find out which emails are registered.
    #[tracing::instrument(name = "RequestPasswordResetUseCase::execute", skip(self))]
    pub async fn execute(&self, email: Email) -> Result<(), RequestPasswordResetError> {
        let user = match self.user_store.find_by_email(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                tracing::debug!("Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let token = self
            .token_issuer
            .issue(user.id(), ActionType::PasswordReset, None)
            .await?;

        let job = NotificationJob::PasswordReset(PasswordResetJobData {
            user_name: user.name().to_owned(),
            user_email: user.email().as_str().to_owned(),
            reset_link: self.links.link_for(ActionType::PasswordReset, &token.token),
            expires_in_minutes: self.token_issuer.ttl().num_minutes(),
        });
        let outcome = self.job_enqueuer.enqueue(job).await;

        self.failure_policy
            .settle(outcome, self.token_issuer.token_store(), &token)
            .await?;

        tracing::info!(user_id = %user.id(), "Password reset requested");

        Ok(())
    }
}
