//! Persistence of user sessions.
//!
//! A session binds a user id to the token set most recently issued for it.
//! There is at most one session per user; logging in again replaces it.

use async_trait::async_trait;
use authgate_shared::{TokenSet, UserSession};
use chrono::{DateTime, Utc};

use crate::error::AppError;

mod memory;
mod postgres;
mod purge;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;
pub use purge::spawn_purge_task;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a fresh session for `user_id`, replacing any existing one.
    async fn create(&self, user_id: &str, tokens: &TokenSet) -> Result<UserSession, AppError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserSession>, AppError>;

    async fn find_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<UserSession>, AppError>;

    /// Overwrite the tokens of an existing session. Fails with
    /// [`AppError::NoSession`] when the user has none.
    async fn update_tokens(
        &self,
        user_id: &str,
        tokens: &TokenSet,
    ) -> Result<UserSession, AppError>;

    /// Returns the number of sessions removed.
    async fn delete_by_user_id(&self, user_id: &str) -> Result<u64, AppError>;

    /// Remove sessions whose refresh token expired at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
