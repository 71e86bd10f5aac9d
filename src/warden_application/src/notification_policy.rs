use serde::Deserialize;
use warden_core::{ActionToken, ActionTokenStore, EnqueueError};

/// What a request flow does when its token was stored but the notification
/// carrying it could not be enqueued.
///
/// There is no default: deployments must pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFailurePolicy {
    /// Report the enqueue failure; the token stays usable.
    Propagate,
    /// Burn the token, then report the enqueue failure.
    RevokeToken,
    /// Log and report success.
    BestEffort,
}

impl NotificationFailurePolicy {
    pub(crate) async fn settle<A>(
        self,
        outcome: Result<(), EnqueueError>,
        token_store: &A,
        token: &ActionToken,
    ) -> Result<(), EnqueueError>
    where
        A: ActionTokenStore,
    {
        let Err(error) = outcome else {
            return Ok(());
        };

        match self {
            NotificationFailurePolicy::Propagate => {
                tracing::error!(
                    user_id = %token.user_id,
                    action_type = %token.action_type,
                    error = %error,
                    "Notification enqueue failed, token left active"
                );
                Err(error)
            }
            NotificationFailurePolicy::RevokeToken => {
                match token_store
                    .find_and_consume(&token.token, token.action_type)
                    .await
                {
                    Ok(_) => tracing::warn!(
                        user_id = %token.user_id,
                        action_type = %token.action_type,
                        error = %error,
                        "Notification enqueue failed, token revoked"
                    ),
                    Err(revoke_error) => tracing::error!(
                        user_id = %token.user_id,
                        action_type = %token.action_type,
                        error = %error,
                        revoke_error = %revoke_error,
                        "Notification enqueue failed and token could not be revoked"
                    ),
                }
                Err(error)
            }
            NotificationFailurePolicy::BestEffort => {
                tracing::warn!(
                    user_id = %token.user_id,
                    action_type = %token.action_type,
                    error = %error,
                    "Notification enqueue failed, continuing"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeActionTokenStore;
    use chrono::Duration;
    use warden_core::{ActionType, UserId};

    async fn stored_token(store: &FakeActionTokenStore) -> ActionToken {
        let token = ActionToken::new(
            "a".repeat(64),
            UserId::new(),
            ActionType::PasswordReset,
            None,
            Duration::minutes(30),
        );
        store.create(&token).await.unwrap();
        token
    }

    fn broker_down() -> Result<(), EnqueueError> {
        Err(EnqueueError::Broker("connection refused".to_owned()))
    }

    #[tokio::test]
    async fn test_propagate_keeps_token() {
        let store = FakeActionTokenStore::default();
        let token = stored_token(&store).await;

        let result = NotificationFailurePolicy::Propagate
            .settle(broker_down(), &store, &token)
            .await;

        assert!(matches!(result, Err(EnqueueError::Broker(_))));
        assert!(store.contains(&token.token).await);
    }

    #[tokio::test]
    async fn test_revoke_token_burns_token() {
        let store = FakeActionTokenStore::default();
        let token = stored_token(&store).await;

        let result = NotificationFailurePolicy::RevokeToken
            .settle(broker_down(), &store, &token)
            .await;

        assert!(result.is_err());
        assert!(!store.contains(&token.token).await);
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let store = FakeActionTokenStore::default();
        let token = stored_token(&store).await;

        let result = NotificationFailurePolicy::BestEffort
            .settle(broker_down(), &store, &token)
            .await;

        assert!(result.is_ok());
        assert!(store.contains(&token.token).await);
    }

    #[tokio::test]
    async fn test_success_is_untouched_by_policy() {
        let store = FakeActionTokenStore::default();
        let token = stored_token(&store).await;

        let result = NotificationFailurePolicy::RevokeToken
            .settle(Ok(()), &store, &token)
            .await;

        assert!(result.is_ok());
        assert!(store.contains(&token.token).await);
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: NotificationFailurePolicy = serde_json::from_str("\"revoke_token\"").unwrap();
        assert_eq!(policy, NotificationFailurePolicy::RevokeToken);
    }
}
