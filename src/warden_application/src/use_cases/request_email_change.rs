use warden_core::{
    ActionLinks, ActionTokenStore, ActionType, Email, EmailChangeConfirmationJobData,
    EnqueueError, Identity, JobEnqueuer, NotificationJob, Password, PasswordHasher,
    PasswordHasherError, SecureTokenGenerator, SecurityNotificationJobData, UserStore,
    UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};
use crate::notification_policy::NotificationFailurePolicy;
use crate::token_issuer::{ActionTokenIssuer, IssueTokenError};

#[derive(Debug, thiserror::Error)]
pub enum RequestEmailChangeError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("New email is the same as the current one")]
    SameEmail,
    #[error("Email already in use")]
    EmailAlreadyInUse,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
    #[error("Failed to issue token: {0}")]
    IssueTokenError(#[from] IssueTokenError),
    #[error("Failed to enqueue notification: {0}")]
    EnqueueError(#[from] EnqueueError),
}

impl ClassifyError for RequestEmailChangeError {
    fn kind(&self) -> ErrorKind {
        match self {
            RequestEmailChangeError::InvalidCredentials => ErrorKind::InvalidCredentials,
            RequestEmailChangeError::SameEmail => ErrorKind::InvalidInput,
            RequestEmailChangeError::EmailAlreadyInUse => ErrorKind::Conflict,
            RequestEmailChangeError::UserStoreError(e) => e.kind(),
            RequestEmailChangeError::PasswordHasherError(_) => ErrorKind::Internal,
            RequestEmailChangeError::IssueTokenError(e) => e.kind(),
            RequestEmailChangeError::EnqueueError(_) => ErrorKind::Enqueue,
        }
    }
}

pub struct RequestEmailChangeUseCase<U, H, A, G, J>
where
    U: UserStore,
    H: PasswordHasher,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    user_store: U,
    password_hasher: H,
    token_issuer: ActionTokenIssuer<A, G>,
    job_enqueuer: J,
    links: ActionLinks,
    failure_policy: NotificationFailurePolicy,
}

impl<U, H, A, G, J> RequestEmailChangeUseCase<U, H, A, G, J>
where
    U: UserStore,
    H: PasswordHasher,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    pub fn new(
        user_store: U,
        password_hasher: H,
        token_issuer: ActionTokenIssuer<A, G>,
        job_enqueuer: J,
        links: ActionLinks,
        failure_policy: NotificationFailurePolicy,
    ) -> Self {
        Self {
            user_store,
            password_hasher,
            token_issuer,
            job_enqueuer,
            links,
            failure_policy,
        }
    }

    /// Starts an email change for the actor.
    ///
    /// The pending address travels as the token payload. Both the confirmation
    /// link and a security notice go to the *current* address.
    ///
    /// # Arguments
    /// * `actor` - Identity from the caller's session
    /// * `current_password` - Re-authentication for this sensitive change
    /// * `new_email` - The address to switch to
    #[tracing::instrument(
        name = "RequestEmailChangeUseCase::execute",
        skip(self, current_password, new_email),
        fields(user_id = %actor.user_id)
    )]
    pub async fn execute(
        &self,
        actor: Identity,
        current_password: Password,
        new_email: Email,
    ) -> Result<(), RequestEmailChangeError> {
        let user = self.user_store.find_by_id(actor.user_id).await?;

        if !self
            .password_hasher
            .compare(user.password_hash(), &current_password)
            .await?
        {
            return Err(RequestEmailChangeError::InvalidCredentials);
        }

        if &new_email == user.email() {
            return Err(RequestEmailChangeError::SameEmail);
        }

        match self
            .user_store
            .find_by_email_including_deleted(&new_email)
            .await
        {
            Ok(_) => return Err(RequestEmailChangeError::EmailAlreadyInUse),
            Err(UserStoreError::UserNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let token = self
            .token_issuer
            .issue(
                user.id(),
                ActionType::EmailConfirmation,
                Some(new_email.as_str().to_owned()),
            )
            .await?;

        let current_email = user.email().as_str().to_owned();

        let confirmation = NotificationJob::EmailChangeConfirmation(EmailChangeConfirmationJobData {
            user_name: user.name().to_owned(),
            to_email: current_email.clone(),
            confirmation_link: self
                .links
                .link_for(ActionType::EmailConfirmation, &token.token),
            expires_in_minutes: self.token_issuer.ttl().num_minutes(),
        });
        let outcome = self.job_enqueuer.enqueue(confirmation).await;
        self.failure_policy
            .settle(outcome, self.token_issuer.token_store(), &token)
            .await?;

        let notice = NotificationJob::SecurityNotification(SecurityNotificationJobData {
            user_name: user.name().to_owned(),
            to_email: current_email,
            message: format!(
                "A request was made to change the email address of your account to {}. \
                 If this wasn't you, change your password immediately.",
                mask_email(new_email.as_str())
            ),
        });
        if let Err(e) = self.job_enqueuer.enqueue(notice).await {
            tracing::warn!(error = %e, "Failed to enqueue security notification");
        }

        tracing::info!("Email change requested");

        Ok(())
    }
}

/// Keeps the first character of the local part and the whole domain.
fn mask_email(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_owned(),
    }
}
