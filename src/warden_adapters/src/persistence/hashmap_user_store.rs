use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use warden_core::{Email, Role, User, UserId, UserStore, UserStoreError};

#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn email_taken_by_other(users: &HashMap<UserId, User>, user: &User) -> bool {
        users
            .values()
            .any(|other| other.id() != user.id() && other.email() == user.email())
    }
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .get(&id)
            .filter(|user| !user.is_deleted())
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|user| user.email() == email && !user.is_deleted())
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_email_including_deleted(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|user| user.email() == email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn save(&self, user: &User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id()) || Self::email_taken_by_other(&users, user) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if Self::email_taken_by_other(&users, user) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        let stored = users
            .get_mut(&user.id())
            .filter(|stored| !stored.is_deleted())
            .ok_or(UserStoreError::UserNotFound)?;
        *stored = user.clone();
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .filter(|user| !user.is_deleted())
            .ok_or(UserStoreError::UserNotFound)?;
        user.mark_as_deleted(Utc::now());
        Ok(())
    }

    async fn count_admins(&self) -> Result<u64, UserStoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| user.role() == Role::Admin && !user.is_deleted())
            .count() as u64)
    }
}
