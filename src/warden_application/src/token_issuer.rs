use chrono::Duration;
use warden_core::{
    ActionToken, ActionTokenStore, ActionTokenStoreError, ActionType,
    DEFAULT_ACTION_TOKEN_TTL_MINUTES, SecureTokenGenerator, TokenGeneratorError, UserId,
};

use crate::error::{ClassifyError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum IssueTokenError {
    #[error("Token generator error: {0}")]
    TokenGeneratorError(#[from] TokenGeneratorError),
    #[error("Action token store error: {0}")]
    ActionTokenStoreError(#[from] ActionTokenStoreError),
}

impl ClassifyError for IssueTokenError {
    fn kind(&self) -> ErrorKind {
        match self {
            IssueTokenError::TokenGeneratorError(_) => ErrorKind::Internal,
            IssueTokenError::ActionTokenStoreError(e) => e.kind(),
        }
    }
}

/// Creates and persists single-use action tokens.
#[derive(Clone)]
pub struct ActionTokenIssuer<A, G>
where
    A: ActionTokenStore,
    G: SecureTokenGenerator,
{
    token_store: A,
    token_generator: G,
    ttl: Duration,
}

impl<A, G> ActionTokenIssuer<A, G>
where
    A: ActionTokenStore,
    G: SecureTokenGenerator,
{
    pub fn new(token_store: A, token_generator: G, ttl: Duration) -> Self {
        Self {
            token_store,
            token_generator,
            ttl,
        }
    }

    pub fn with_default_ttl(token_store: A, token_generator: G) -> Self {
        Self::new(
            token_store,
            token_generator,
            Duration::minutes(DEFAULT_ACTION_TOKEN_TTL_MINUTES),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn token_store(&self) -> &A {
        &self.token_store
    }

    pub(crate) async fn issue(
        &self,
        user_id: UserId,
        action_type: ActionType,
        payload: Option<String>,
    ) -> Result<ActionToken, IssueTokenError> {
        let token = ActionToken::new(
            self.token_generator.generate()?,
            user_id,
            action_type,
            payload,
            self.ttl,
        );
        self.token_store.create(&token).await?;

        tracing::debug!(
            user_id = %user_id,
            action_type = %action_type,
            expires_at = %token.expires_at,
            "Action token issued"
        );

        Ok(token)
    }
}
