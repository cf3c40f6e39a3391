use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenSet;

/// A provider-supplied lifetime that cannot be turned into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} of {seconds} seconds is out of range")]
pub struct ExpiryOutOfRange {
    pub field: &'static str,
    pub seconds: i64,
}

/// Absolute expiry instants derived from a token set's relative lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenExpiry {
    pub expires_at: DateTime<Utc>,
    /// `None` when the refresh token never expires (`refresh_expires_in <= 0`,
    /// as sent for offline tokens).
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl TokenExpiry {
    pub fn from_tokens(tokens: &TokenSet, now: DateTime<Utc>) -> Result<Self, ExpiryOutOfRange> {
        let refresh_expires_at = if tokens.refresh_expires_in > 0 {
            Some(offset(now, tokens.refresh_expires_in, "refresh_expires_in")?)
        } else {
            None
        };

        Ok(Self {
            expires_at: offset(now, tokens.expires_in, "expires_in")?,
            refresh_expires_at,
        })
    }
}

fn offset(
    now: DateTime<Utc>,
    seconds: i64,
    field: &'static str,
) -> Result<DateTime<Utc>, ExpiryOutOfRange> {
    Duration::try_seconds(seconds)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or(ExpiryOutOfRange { field, seconds })
}

/// Server-side session binding a user id to its current token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: String,
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(
        user_id: impl Into<String>,
        tokens: &TokenSet,
        now: DateTime<Utc>,
    ) -> Result<Self, ExpiryOutOfRange> {
        let expiry = TokenExpiry::from_tokens(tokens, now)?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            access_token: tokens.access_token.clone(),
            expires_in: tokens.expires_in,
            refresh_token: tokens.refresh_token.clone(),
            refresh_expires_in: tokens.refresh_expires_in,
            expires_at: expiry.expires_at,
            refresh_expires_at: expiry.refresh_expires_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the stored tokens and recompute both expiry instants. The
    /// session is left untouched on error.
    pub fn apply_tokens(
        &mut self,
        tokens: &TokenSet,
        now: DateTime<Utc>,
    ) -> Result<(), ExpiryOutOfRange> {
        let expiry = TokenExpiry::from_tokens(tokens, now)?;

        self.access_token = tokens.access_token.clone();
        self.expires_in = tokens.expires_in;
        self.refresh_token = tokens.refresh_token.clone();
        self.refresh_expires_in = tokens.refresh_expires_in;
        self.expires_at = expiry.expires_at;
        self.refresh_expires_at = expiry.refresh_expires_at;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_refresh_expired(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at.map_or(false, |at| at <= now)
    }
}
