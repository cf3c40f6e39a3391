use async_trait::async_trait;
use authgate_shared::{TokenExpiry, TokenSet, UserSession};
use chrono::{DateTime, Utc};

use super::SessionStore;
use crate::db::DbPool;
use crate::error::AppError;

const SESSION_COLUMNS: &str = "id, user_id, access_token, expires_in, refresh_token, \
     refresh_expires_in, expires_at, refresh_expires_at, created_at, updated_at";

pub struct PgSessionStore {
    db: DbPool,
}

impl PgSessionStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: &str, tokens: &TokenSet) -> Result<UserSession, AppError> {
        let session = UserSession::new(user_id, tokens, Utc::now())?;

        let stored = sqlx::query_as::<_, UserSession>(&format!(
            r#"
            INSERT INTO usersess ({SESSION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                expires_in = EXCLUDED.expires_in,
                refresh_token = EXCLUDED.refresh_token,
                refresh_expires_in = EXCLUDED.refresh_expires_in,
                expires_at = EXCLUDED.expires_at,
                refresh_expires_at = EXCLUDED.refresh_expires_at,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.id)
        .bind(&session.user_id)
        .bind(&session.access_token)
        .bind(session.expires_in)
        .bind(&session.refresh_token)
        .bind(session.refresh_expires_in)
        .bind(session.expires_at)
        .bind(session.refresh_expires_at)
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(stored)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserSession>, AppError> {
        let session = sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM usersess WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    async fn find_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<UserSession>, AppError> {
        let session = sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM usersess WHERE access_token = $1"
        ))
        .bind(access_token)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    async fn update_tokens(
        &self,
        user_id: &str,
        tokens: &TokenSet,
    ) -> Result<UserSession, AppError> {
        let now = Utc::now();
        let expiry = TokenExpiry::from_tokens(tokens, now)?;

        let updated = sqlx::query_as::<_, UserSession>(&format!(
            r#"
            UPDATE usersess SET
                access_token = $2,
                expires_in = $3,
                refresh_token = $4,
                refresh_expires_in = $5,
                expires_at = $6,
                refresh_expires_at = $7,
                updated_at = $8
            WHERE user_id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&tokens.access_token)
        .bind(tokens.expires_in)
        .bind(&tokens.refresh_token)
        .bind(tokens.refresh_expires_in)
        .bind(expiry.expires_at)
        .bind(expiry.refresh_expires_at)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;

        updated.ok_or(AppError::NoSession)
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM usersess WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM usersess WHERE refresh_expires_at IS NOT NULL AND refresh_expires_at <= $1",
        )
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
