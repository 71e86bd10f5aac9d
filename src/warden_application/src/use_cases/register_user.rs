use warden_core::{
    AccountVerificationJobData, ActionLinks, ActionTokenStore, ActionType, Email, EnqueueError,
    JobEnqueuer, NotificationJob, Password, PasswordHasher, PasswordHasherError, Role,
    SecureTokenGenerator, User, UserError, UserId, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};
use crate::notification_policy::NotificationFailurePolicy;
use crate::token_issuer::{ActionTokenIssuer, IssueTokenError};

#[derive(Debug, thiserror::Error)]
pub enum RegisterUserError {
    #[error("Email already in use")]
    EmailAlreadyInUse,
    #[error("Invalid user: {0}")]
    InvalidUser(#[from] UserError),
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
    #[error("Failed to issue token: {0}")]
    IssueTokenError(#[from] IssueTokenError),
    #[error("Failed to enqueue notification: {0}")]
    EnqueueError(#[from] EnqueueError),
}

impl From<UserStoreError> for RegisterUserError {
    fn from(error: UserStoreError) -> Self {
        match error {
            UserStoreError::UserAlreadyExists => RegisterUserError::EmailAlreadyInUse,
            other => RegisterUserError::UserStoreError(other),
        }
    }
}

impl ClassifyError for RegisterUserError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegisterUserError::EmailAlreadyInUse => ErrorKind::Conflict,
            RegisterUserError::InvalidUser(_) => ErrorKind::InvalidInput,
            RegisterUserError::UserStoreError(e) => e.kind(),
            RegisterUserError::PasswordHasherError(_) => ErrorKind::Internal,
            RegisterUserError::IssueTokenError(e) => e.kind(),
            RegisterUserError::EnqueueError(_) => ErrorKind::Enqueue,
        }
    }
}

/// Sign-up: stores an unverified client account and sends its first
/// verification link.
pub struct RegisterUserUseCase<U, H, A, G, J>
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

impl<U, H, A, G, J> RegisterUserUseCase<U, H, A, G, J>
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

    /// The account is committed before the notification step, so a policy
    /// error here still leaves a registered (unverified) user who can ask for
    /// a new link.
    #[tracing::instrument(name = "RegisterUserUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        name: String,
        email: Email,
        password: Password,
    ) -> Result<UserId, RegisterUserError> {
        match self
            .user_store
            .find_by_email_including_deleted(&email)
            .await
        {
            Ok(_) => return Err(RegisterUserError::EmailAlreadyInUse),
            Err(UserStoreError::UserNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.password_hasher.hash(&password).await?;
        let user = User::new(name, email, password_hash, Role::Client)?;
        self.user_store.save(&user).await?;

        let token = self
            .token_issuer
            .issue(user.id(), ActionType::AccountVerification, None)
            .await?;

        let job = NotificationJob::AccountVerification(AccountVerificationJobData {
            user_name: user.name().to_owned(),
            to_email: user.email().as_str().to_owned(),
            verification_link: self
                .links
                .link_for(ActionType::AccountVerification, &token.token),
            expires_in_minutes: self.token_issuer.ttl().num_minutes(),
        });
        let outcome = self.job_enqueuer.enqueue(job).await;
        self.failure_policy
            .settle(outcome, self.token_issuer.token_store(), &token)
            .await?;

        tracing::info!(user_id = %user.id(), "User registered");

        Ok(user.id())
    }
}
