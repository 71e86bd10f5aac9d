use std::time::Duration;

use warden_adapters::config::{ApplicationSettings, AuthSettings};
use warden_application::{
    ActionTokenIssuer, ChangePasswordUseCase, ConfirmAccountUserUseCase,
    ConfirmEmailChangeUseCase, ConfirmPasswordResetUseCase, DeleteUserUseCase, LoginUseCase,
    NotificationFailurePolicy, PromoteUserUseCase, RegisterUserUseCase,
    RequestAccountValidationUseCase, RequestEmailChangeUseCase, RequestPasswordResetUseCase,
};
use warden_core::{
    ActionLinks, ActionTokenStore, Identity, JobEnqueuer, PasswordHasher, RateLimiter,
    SecureTokenGenerator, SessionError, SessionManager, UserStore,
};

/// Everything the identity pipeline talks to.
pub struct IdentityPorts<U, A, R, H, G, S, J> {
    pub user_store: U,
    pub token_store: A,
    pub rate_limiter: R,
    pub password_hasher: H,
    pub token_generator: G,
    pub session_manager: S,
    pub job_enqueuer: J,
}

/// Tunables shared by the use cases.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub links: ActionLinks,
    pub action_token_ttl: chrono::Duration,
    pub resend_verification_window: Duration,
    pub failure_policy: NotificationFailurePolicy,
}

impl IdentityConfig {
    pub fn from_settings(application: &ApplicationSettings, auth: &AuthSettings) -> Self {
        Self {
            links: application.links.clone(),
            action_token_ttl: auth.action_token_ttl(),
            resend_verification_window: auth.resend_verification_window(),
            failure_policy: auth.notification_failure_policy,
        }
    }
}

/// One instance of every identity use case, wired to a shared set of ports.
pub struct IdentityService<U, A, R, H, G, S, J>
where
    U: UserStore + Clone,
    A: ActionTokenStore + Clone,
    R: RateLimiter,
    H: PasswordHasher + Clone,
    G: SecureTokenGenerator + Clone,
    S: SessionManager + Clone,
    J: JobEnqueuer + Clone,
{
    pub login: LoginUseCase<U, H, S>,
    pub change_password: ChangePasswordUseCase<U, H>,
    pub register_user: RegisterUserUseCase<U, H, A, G, J>,
    pub request_password_reset: RequestPasswordResetUseCase<U, A, G, J>,
    pub confirm_password_reset: ConfirmPasswordResetUseCase<U, A, H>,
    pub request_email_change: RequestEmailChangeUseCase<U, H, A, G, J>,
    pub confirm_email_change: ConfirmEmailChangeUseCase<U, A>,
    pub request_account_validation: RequestAccountValidationUseCase<U, R, A, G, J>,
    pub confirm_account_user: ConfirmAccountUserUseCase<U, A>,
    pub promote_user: PromoteUserUseCase<U, J>,
    pub delete_user: DeleteUserUseCase<U>,
    session_manager: S,
}

impl<U, A, R, H, G, S, J> IdentityService<U, A, R, H, G, S, J>
where
    U: UserStore + Clone,
    A: ActionTokenStore + Clone,
    R: RateLimiter,
    H: PasswordHasher + Clone,
    G: SecureTokenGenerator + Clone,
    S: SessionManager + Clone,
    J: JobEnqueuer + Clone,
{
    pub fn new(ports: IdentityPorts<U, A, R, H, G, S, J>, config: IdentityConfig) -> Self {
        let IdentityPorts {
            user_store,
            token_store,
            rate_limiter,
            password_hasher,
            token_generator,
            session_manager,
            job_enqueuer,
        } = ports;

        let issuer = ActionTokenIssuer::new(
            token_store.clone(),
            token_generator,
            config.action_token_ttl,
        );

        Self {
            login: LoginUseCase::new(
                user_store.clone(),
                password_hasher.clone(),
                session_manager.clone(),
            ),
            change_password: ChangePasswordUseCase::new(
                user_store.clone(),
                password_hasher.clone(),
            ),
            register_user: RegisterUserUseCase::new(
                user_store.clone(),
                password_hasher.clone(),
                issuer.clone(),
                job_enqueuer.clone(),
                config.links.clone(),
                config.failure_policy,
            ),
            request_password_reset: RequestPasswordResetUseCase::new(
                user_store.clone(),
                issuer.clone(),
                job_enqueuer.clone(),
                config.links.clone(),
                config.failure_policy,
            ),
            confirm_password_reset: ConfirmPasswordResetUseCase::new(
                user_store.clone(),
                token_store.clone(),
                password_hasher.clone(),
            ),
            request_email_change: RequestEmailChangeUseCase::new(
                user_store.clone(),
                password_hasher,
                issuer.clone(),
                job_enqueuer.clone(),
                config.links.clone(),
                config.failure_policy,
            ),
            confirm_email_change: ConfirmEmailChangeUseCase::new(
                user_store.clone(),
                token_store.clone(),
            ),
            request_account_validation: RequestAccountValidationUseCase::new(
                user_store.clone(),
                rate_limiter,
                issuer,
                job_enqueuer.clone(),
                config.links,
                config.failure_policy,
            )
            .with_window(config.resend_verification_window),
            confirm_account_user: ConfirmAccountUserUseCase::new(user_store.clone(), token_store),
            promote_user: PromoteUserUseCase::new(user_store.clone(), job_enqueuer),
            delete_user: DeleteUserUseCase::new(user_store),
            session_manager,
        }
    }

    /// Resolves a session token to the identity it was issued for.
    pub fn authenticate(&self, session_token: &str) -> Result<Identity, SessionError> {
        self.session_manager.validate(session_token)
    }
}
