use std::time::Duration;

use warden_core::{
    AccountVerificationJobData, ActionLinks, ActionTokenStore, ActionType, Email, EnqueueError,
    JobEnqueuer, NotificationJob, RateLimiter, RateLimiterError, SecureTokenGenerator, UserStore,
    UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};
use crate::notification_policy::NotificationFailurePolicy;
use crate::token_issuer::{ActionTokenIssuer, IssueTokenError};

pub const DEFAULT_RESEND_VERIFICATION_WINDOW: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, thiserror::Error)]
pub enum RequestAccountValidationError {
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("User already verified")]
    UserAlreadyVerified,
    #[error("Rate limiter error: {0}")]
    RateLimiterError(#[from] RateLimiterError),
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Failed to issue token: {0}")]
    IssueTokenError(#[from] IssueTokenError),
    #[error("Failed to enqueue notification: {0}")]
    EnqueueError(#[from] EnqueueError),
}

impl ClassifyError for RequestAccountValidationError {
    fn kind(&self) -> ErrorKind {
        match self {
            RequestAccountValidationError::RateLimitExceeded => ErrorKind::RateLimitExceeded,
            RequestAccountValidationError::UserAlreadyVerified => ErrorKind::UserAlreadyVerified,
            RequestAccountValidationError::RateLimiterError(_) => ErrorKind::Storage,
            RequestAccountValidationError::UserStoreError(e) => e.kind(),
            RequestAccountValidationError::IssueTokenError(e) => e.kind(),
            RequestAccountValidationError::EnqueueError(_) => ErrorKind::Enqueue,
        }
    }
}

/// Re-sends the account verification link, at most once per window per email.
pub struct RequestAccountValidationUseCase<U, R, A, G, J>
where
    U: UserStore,
    R: RateLimiter,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    user_store: U,
    rate_limiter: R,
    token_issuer: ActionTokenIssuer<A, G>,
    job_enqueuer: J,
    links: ActionLinks,
    failure_policy: NotificationFailurePolicy,
    window: Duration,
}

impl<U, R, A, G, J> RequestAccountValidationUseCase<U, R, A, G, J>
where
    U: UserStore,
    R: RateLimiter,
    A: ActionTokenStore,
    G: SecureTokenGenerator,
    J: JobEnqueuer,
{
    pub fn new(
        user_store: U,
        rate_limiter: R,
        token_issuer: ActionTokenIssuer<A, G>,
        job_enqueuer: J,
        links: ActionLinks,
        failure_policy: NotificationFailurePolicy,
    ) -> Self {
        Self {
            user_store,
            rate_limiter,
            token_issuer,
            job_enqueuer,
            links,
            failure_policy,
            window: DEFAULT_RESEND_VERIFICATION_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    #[tracing::instrument(name = "RequestAccountValidationUseCase::execute", skip(self))]
    pub async fn execute(&self, email: Email) -> Result<(), RequestAccountValidationError> {
        let key = rate_limit_key(&email);
        if !self.rate_limiter.allow(&key, self.window).await? {
            tracing::warn!("Verification resend rate limited");
            return Err(RequestAccountValidationError::RateLimitExceeded);
        }

        let user = match self.user_store.find_by_email(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                tracing::debug!("Verification requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if user.is_verified() {
            return Err(RequestAccountValidationError::UserAlreadyVerified);
        }

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

        tracing::info!(user_id = %user.id(), "Account verification requested");

        Ok(())
    }
}

fn rate_limit_key(email: &Email) -> String {
    format!("resend-verification:{}", email.as_str())
}
