use std::sync::Arc;

use anyhow::Context;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod idp;
pub mod routes;
pub mod session;

pub use config::Config;
pub use db::DbPool;
pub use routes::{create_router, AppState};

use auth::TokenVerifier;
use config::StoreKind;
use idp::OidcProvider;
use session::{MemorySessionStore, PgSessionStore, SessionStore};

/// Wire collaborators selected by `config` into the router state.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let sessions: Arc<dyn SessionStore> = match config.store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when SESSION_STORE=postgres")?;
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgSessionStore::new(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    let idp = OidcProvider::new(&config.idp).context("Failed to build identity provider client")?;
    let verifier = TokenVerifier::new(&config.token_key, config.token_issuer.as_deref())
        .context("Invalid token verification key")?;

    Ok(AppState {
        sessions,
        idp: Arc::new(idp),
        verifier,
    })
}
