use std::time::Duration;

use async_trait::async_trait;
use authgate_shared::TokenSet;
use reqwest::{Client, Response};
use serde::Deserialize;

use super::{IdentityProvider, IdpError};
use crate::config::IdpConfig;

/// OAuth2 error body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Token endpoint client for an OpenID Connect provider such as Keycloak.
pub struct OidcProvider {
    client: Client,
    token_url: String,
    logout_url: Option<String>,
    client_id: String,
    client_secret: Option<String>,
}

impl OidcProvider {
    pub fn new(config: &IdpConfig) -> Result<Self, IdpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            logout_url: config.logout_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Form fields identifying this client, followed by `extra`.
    fn form<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut form = vec![("client_id", self.client_id.as_str())];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.as_str()));
        }
        form.extend_from_slice(extra);
        form
    }

    async fn request_tokens(&self, extra: &[(&str, &str)]) -> Result<TokenSet, IdpError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&self.form(extra))
            .send()
            .await?;

        let body = check_status(response).await?;
        serde_json::from_str(&body).map_err(|e| IdpError::Decode(e.to_string()))
    }
}

/// Returns the body of a successful response, or the provider's error.
async fn check_status(response: Response) -> Result<String, IdpError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    tracing::debug!("Identity provider returned {}: {}", status, body);
    match serde_json::from_str::<OAuthErrorBody>(&body) {
        Ok(err) => Err(IdpError::Rejected {
            error: err.error,
            description: err.error_description,
        }),
        Err(_) => Err(IdpError::Status(status.as_u16())),
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    async fn password_grant(&self, username: &str, password: &str) -> Result<TokenSet, IdpError> {
        self.request_tokens(&[
            ("grant_type", "password"),
            ("scope", "openid"),
            ("username", username),
            ("password", password),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdpError> {
        self.request_tokens(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), IdpError> {
        let Some(logout_url) = &self.logout_url else {
            return Ok(());
        };

        let response = self
            .client
            .post(logout_url)
            .form(&self.form(&[("refresh_token", refresh_token)]))
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }
}
