use chrono::{DateTime, Utc};
use secrecy::Secret;
use thiserror::Error;

use super::{Email, Identity, Role, UserId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Name can't be empty")]
    EmptyName,
}

/// Fields needed to rebuild a [`User`] from storage.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: Secret<String>,
    pub role: Role,
    pub verified_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    name: String,
    email: Email,
    password_hash: Secret<String>,
    role: Role,
    verified_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a fresh, unverified account.
    pub fn new(
        name: String,
        email: Email,
        password_hash: Secret<String>,
        role: Role,
    ) -> Result<Self, UserError> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }

        Ok(Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            role,
            verified_at: None,
            deleted_at: None,
        })
    }

    pub fn from_record(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            role: record.role,
            verified_at: record.verified_at,
            deleted_at: record.deleted_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &Secret<String> {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    pub fn change_email(&mut self, email: Email) {
        self.email = email;
    }

    pub fn set_password_hash(&mut self, password_hash: Secret<String>) {
        self.password_hash = password_hash;
    }

    pub fn change_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Marks the account as verified. Calling it again keeps the first timestamp.
    pub fn mark_as_verified(&mut self, at: DateTime<Utc>) {
        if self.verified_at.is_none() {
            self.verified_at = Some(at);
        }
    }

    pub fn mark_as_deleted(&mut self, at: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(at);
        }
    }
}
