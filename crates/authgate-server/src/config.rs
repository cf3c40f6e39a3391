use std::env;

use anyhow::{bail, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// How access token signatures are checked.
#[derive(Debug, Clone)]
pub enum TokenKey {
    /// HS256 shared secret
    Secret(String),
    /// RS256 public key, PEM encoded
    RsaPublicPem(String),
}

#[derive(Debug, Clone)]
pub struct IdpConfig {
    pub token_url: String,
    pub logout_url: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub idp: IdpConfig,
    pub token_key: TokenKey,
    pub token_issuer: Option<String>,
    pub session_purge_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match env::var("SESSION_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreKind::Postgres,
            "memory" => StoreKind::Memory,
            other => bail!("SESSION_STORE must be 'postgres' or 'memory', got '{}'", other),
        };

        let database_url = optional("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when SESSION_STORE=postgres");
        }

        let token_key = match env::var("JWT_ALGORITHM")
            .unwrap_or_else(|_| "RS256".to_string())
            .to_uppercase()
            .as_str()
        {
            "HS256" => TokenKey::Secret(
                env::var("JWT_SECRET").context("JWT_SECRET must be set for HS256")?,
            ),
            "RS256" => TokenKey::RsaPublicPem(
                env::var("JWT_PUBLIC_KEY").context("JWT_PUBLIC_KEY must be set for RS256")?,
            ),
            other => bail!("JWT_ALGORITHM must be HS256 or RS256, got '{}'", other),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a port number")?,
            store,
            database_url,
            idp: IdpConfig {
                token_url: env::var("IDP_TOKEN_URL").context("IDP_TOKEN_URL must be set")?,
                logout_url: optional("IDP_LOGOUT_URL"),
                client_id: env::var("IDP_CLIENT_ID").context("IDP_CLIENT_ID must be set")?,
                client_secret: optional("IDP_CLIENT_SECRET"),
                timeout_secs: env::var("IDP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("IDP_TIMEOUT_SECS must be an integer")?,
            },
            token_key,
            token_issuer: optional("JWT_ISSUER"),
            session_purge_interval_secs: env::var("SESSION_PURGE_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string()) // 5 minutes
                .parse()
                .context("SESSION_PURGE_INTERVAL_SECS must be an integer")?,
        })
    }
}

/// Unset and empty are treated alike.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
