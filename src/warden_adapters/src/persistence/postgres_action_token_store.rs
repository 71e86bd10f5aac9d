use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;
use warden_core::{
    ActionToken, ActionTokenStore, ActionTokenStoreError, ActionType, InvalidTokenReason, UserId,
};

#[derive(Clone)]
pub struct PostgresActionTokenStore {
    pool: PgPool,
}

impl PostgresActionTokenStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresActionTokenStore { pool }
    }
}

#[async_trait::async_trait]
impl ActionTokenStore for PostgresActionTokenStore {
    #[tracing::instrument(name = "Adding action token to PostgreSQL", skip_all)]
    async fn create(&self, token: &ActionToken) -> Result<(), ActionTokenStoreError> {
        sqlx::query(
            r#"
                INSERT INTO action_tokens (token, user_id, type, payload, expires_at)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&token.token)
        .bind(*token.user_id.as_uuid())
        .bind(token.action_type.as_str())
        .bind(token.payload.as_deref())
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => ActionTokenStoreError::DuplicateToken,
            _ => ActionTokenStoreError::UnexpectedError(e.to_string()),
        })?;

        Ok(())
    }

    /// The row is removed by the same statement that reads it, so two racing
    /// callers can never both receive it. Expired rows are deleted too.
    #[tracing::instrument(name = "Consuming action token in PostgreSQL", skip_all)]
    async fn find_and_consume(
        &self,
        token: &str,
        action_type: ActionType,
    ) -> Result<ActionToken, ActionTokenStoreError> {
        let row = sqlx::query(
            r#"
                DELETE FROM action_tokens
                WHERE token = $1 AND type = $2
                RETURNING token, user_id, type, payload, expires_at
            "#,
        )
        .bind(token)
        .bind(action_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ActionTokenStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(ActionTokenStoreError::InvalidToken(
                InvalidTokenReason::NotFound,
            ));
        };

        let consumed = token_from_row(&row)?;
        if consumed.is_expired() {
            return Err(ActionTokenStoreError::InvalidToken(
                InvalidTokenReason::Expired,
            ));
        }

        Ok(consumed)
    }

    #[tracing::instrument(name = "Purging expired action tokens in PostgreSQL", skip_all)]
    async fn purge_expired(&self) -> Result<u64, ActionTokenStoreError> {
        let result = sqlx::query("DELETE FROM action_tokens WHERE expires_at < now()")
            .execute(&self.pool)
            .await
            .map_err(|e| ActionTokenStoreError::UnexpectedError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn token_from_row(row: &PgRow) -> Result<ActionToken, ActionTokenStoreError> {
    let unexpected = |e: sqlx::Error| ActionTokenStoreError::UnexpectedError(e.to_string());

    let token: String = row.try_get("token").map_err(unexpected)?;
    let user_id: Uuid = row.try_get("user_id").map_err(unexpected)?;
    let action_type: String = row.try_get("type").map_err(unexpected)?;
    let payload: Option<String> = row.try_get("payload").map_err(unexpected)?;
    let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(unexpected)?;

    let action_type = action_type
        .parse::<ActionType>()
        .map_err(|e| ActionTokenStoreError::UnexpectedError(e.to_string()))?;

    Ok(ActionToken {
        token,
        user_id: UserId::from(user_id),
        action_type,
        payload,
        expires_at,
    })
}
