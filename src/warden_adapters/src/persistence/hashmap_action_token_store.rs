use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use warden_core::{
    ActionToken, ActionTokenStore, ActionTokenStoreError, ActionType, InvalidTokenReason,
};

/// Process-local token store. The write lock makes find-and-consume atomic
/// for every caller sharing this instance.
#[derive(Default, Clone)]
pub struct HashMapActionTokenStore {
    tokens: Arc<RwLock<HashMap<String, ActionToken>>>,
}

impl HashMapActionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.tokens.read().await.contains_key(token)
    }

    pub async fn tokens_for(&self, action_type: ActionType) -> Vec<ActionToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|token| token.action_type == action_type)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ActionTokenStore for HashMapActionTokenStore {
    async fn create(&self, token: &ActionToken) -> Result<(), ActionTokenStoreError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(ActionTokenStoreError::DuplicateToken);
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_and_consume(
        &self,
        token: &str,
        action_type: ActionType,
    ) -> Result<ActionToken, ActionTokenStoreError> {
        let consumed = {
            let mut tokens = self.tokens.write().await;
            let type_matches = tokens
                .get(token)
                .is_some_and(|stored| stored.action_type == action_type);
            if type_matches { tokens.remove(token) } else { None }
        };

        let consumed = consumed.ok_or(ActionTokenStoreError::InvalidToken(
            InvalidTokenReason::NotFound,
        ))?;

        if consumed.is_expired() {
            return Err(ActionTokenStoreError::InvalidToken(
                InvalidTokenReason::Expired,
            ));
        }

        Ok(consumed)
    }

    async fn purge_expired(&self) -> Result<u64, ActionTokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}
