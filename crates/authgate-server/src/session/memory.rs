use std::collections::HashMap;

use async_trait::async_trait;
use authgate_shared::{TokenSet, UserSession};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::SessionStore;
use crate::error::AppError;

/// Process-local session store keyed by user id.
///
/// Sessions are lost on restart. Intended for development and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: &str, tokens: &TokenSet) -> Result<UserSession, AppError> {
        let session = UserSession::new(user_id, tokens, Utc::now())?;
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session.clone());
        Ok(session)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserSession>, AppError> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn find_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<UserSession>, AppError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.access_token == access_token)
            .cloned())
    }

    async fn update_tokens(
        &self,
        user_id: &str,
        tokens: &TokenSet,
    ) -> Result<UserSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(user_id).ok_or(AppError::NoSession)?;
        session.apply_tokens(tokens, Utc::now())?;
        Ok(session.clone())
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<u64, AppError> {
        Ok(self.sessions.write().await.remove(user_id).map_or(0, |_| 1))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_refresh_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
