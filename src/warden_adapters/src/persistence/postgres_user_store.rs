use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;
use warden_core::{Email, User, UserId, UserRecord, UserStore, UserStoreError};

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresUserStore { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: UserId) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, name, email, password_hash, role, verified_at, deleted_at
                FROM users
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        user_from_row(&row)
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, name, email, password_hash, role, verified_at, deleted_at
                FROM users
                WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        user_from_row(&row)
    }

    #[tracing::instrument(
        name = "Retrieving user by email including deleted from PostgreSQL",
        skip_all
    )]
    async fn find_by_email_including_deleted(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, name, email, password_hash, role, verified_at, deleted_at
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        user_from_row(&row)
    }

    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn save(&self, user: &User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
                INSERT INTO users (id, name, email, password_hash, role, verified_at, deleted_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*user.id().as_uuid())
        .bind(user.name())
        .bind(user.email().as_str())
        .bind(user.password_hash().expose_secret())
        .bind(user.role().as_str())
        .bind(user.verified_at())
        .bind(user.deleted_at())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Updating user in PostgreSQL", skip_all)]
    async fn update(&self, user: &User) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET name = $2, email = $3, password_hash = $4, role = $5, verified_at = $6
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(*user.id().as_uuid())
        .bind(user.name())
        .bind(user.email().as_str())
        .bind(user.password_hash().expose_secret())
        .bind(user.role().as_str())
        .bind(user.verified_at())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Soft deleting user in PostgreSQL", skip_all)]
    async fn delete(&self, id: UserId) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET deleted_at = now()
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(*id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Counting admins in PostgreSQL", skip_all)]
    async fn count_admins(&self) -> Result<u64, UserStoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = 'admin' AND deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}

fn map_write_error(e: sqlx::Error) -> UserStoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return UserStoreError::UserAlreadyExists;
        }
    }
    UserStoreError::UnexpectedError(e.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, UserStoreError> {
    let unexpected = |e: sqlx::Error| UserStoreError::UnexpectedError(e.to_string());

    let id: Uuid = row.try_get("id").map_err(unexpected)?;
    let name: String = row.try_get("name").map_err(unexpected)?;
    let email: String = row.try_get("email").map_err(unexpected)?;
    let password_hash: String = row.try_get("password_hash").map_err(unexpected)?;
    let role: String = row.try_get("role").map_err(unexpected)?;
    let verified_at: Option<DateTime<Utc>> = row.try_get("verified_at").map_err(unexpected)?;
    let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at").map_err(unexpected)?;

    let email = Email::try_from(Secret::new(email))
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
    let role = role
        .parse()
        .map_err(|e: warden_core::RoleError| UserStoreError::UnexpectedError(e.to_string()))?;

    Ok(User::from_record(UserRecord {
        id: UserId::from(id),
        name,
        email,
        password_hash: Secret::new(password_hash),
        role,
        verified_at,
        deleted_at,
    }))
}
