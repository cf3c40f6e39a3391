//! Identity provider seam.
//!
//! Password verification and token issuance are owned by an external
//! OpenID Connect server. Handlers only see the [`IdentityProvider`] trait so
//! tests can swap in a fake.

use async_trait::async_trait;
use authgate_shared::TokenSet;

mod oidc;

pub use oidc::OidcProvider;

#[derive(Debug, thiserror::Error)]
pub enum IdpError {
    /// The provider answered with an OAuth2 error body.
    #[error("{}", rejected_message(.error, .description))]
    Rejected {
        error: String,
        description: Option<String>,
    },

    /// The provider answered with an error status and no OAuth2 error body.
    #[error("identity provider returned HTTP {0}")]
    Status(u16),

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected identity provider response: {0}")]
    Decode(String),
}

fn rejected_message<'a>(error: &'a str, description: &'a Option<String>) -> &'a str {
    description.as_deref().unwrap_or(error)
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange user credentials for a token set (resource owner password grant).
    async fn password_grant(&self, username: &str, password: &str) -> Result<TokenSet, IdpError>;

    /// Exchange a refresh token for a new token set.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdpError>;

    /// End the provider-side session bound to `refresh_token`.
    async fn revoke(&self, refresh_token: &str) -> Result<(), IdpError>;
}
