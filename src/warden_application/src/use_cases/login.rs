use warden_core::{
    Email, Identity, Password, PasswordHasher, PasswordHasherError, SessionError, SessionManager,
    SessionToken, UserStore, UserStoreError,
};

use crate::error::{ClassifyError, ErrorKind};

/// Response from login use case
#[derive(Debug)]
pub struct LoginResponse {
    pub identity: Identity,
    pub session: SessionToken,
}

/// Error types specific to login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Password hasher error: {0}")]
    PasswordHasherError(#[from] PasswordHasherError),
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),
}

impl From<UserStoreError> for LoginError {
    fn from(error: UserStoreError) -> Self {
        match error {
            UserStoreError::UserNotFound => LoginError::InvalidCredentials,
            other => LoginError::UserStoreError(other),
        }
    }
}

impl ClassifyError for LoginError {
    fn kind(&self) -> ErrorKind {
        match self {
            LoginError::InvalidCredentials => ErrorKind::InvalidCredentials,
            LoginError::EmailNotVerified => ErrorKind::EmailNotVerified,
            LoginError::UserStoreError(e) => e.kind(),
            LoginError::PasswordHasherError(_) | LoginError::SessionError(_) => ErrorKind::Internal,
        }
    }
}

/// Login use case - exchanges credentials for a session
pub struct LoginUseCase<U, H, S>
where
    U: UserStore,
    H: PasswordHasher,
    S: SessionManager,
{
    user_store: U,
    password_hasher: H,
    session_manager: S,
}

impl<U, H, S> LoginUseCase<U, H, S>
where
    U: UserStore,
    H: PasswordHasher,
    S: SessionManager,
{
    pub fn new(user_store: U, password_hasher: H, session_manager: S) -> Self {
        Self {
            user_store,
            password_hasher,
            session_manager,
        }
    }

    /// Execute the login use case
    ///
    /// Unknown email and wrong password produce the same error. An
    /// unverified account is turned away before its password is compared.
    ///
    /// # Arguments
    /// * `email` - User's email address
    /// * `password` - User's password
    ///
    /// # Returns
    /// The authenticated identity and its session token
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
    ) -> Result<LoginResponse, LoginError> {
        let user = self.user_store.find_by_email(&email).await?;

        if !user.is_verified() {
            return Err(LoginError::EmailNotVerified);
        }

        if !self
            .password_hasher
            .compare(user.password_hash(), &password)
            .await?
        {
            return Err(LoginError::InvalidCredentials);
        }

        let identity = user.identity();
        let session = self.session_manager.generate(&identity)?;

        tracing::info!(user_id = %identity.user_id, "User logged in");

        Ok(LoginResponse { identity, session })
    }
}
