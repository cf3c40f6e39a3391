use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::TokenKey;
use crate::error::AppError;

/// Roles every provider account carries; never reported as the user's role.
const DEFAULT_ROLES: [&str; 2] = ["offline_access", "uma_authorization"];
const DEFAULT_ROLES_PREFIX: &str = "default-roles-";

#[derive(Debug, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims of an access token issued by the identity provider.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub exp: i64,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
}

impl Claims {
    pub fn username(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.preferred_username.clone())
            .unwrap_or_default()
    }

    /// Explicit `role` claim, else the first non-default realm role.
    pub fn role(&self) -> String {
        if let Some(role) = self.role.as_ref().filter(|r| !r.is_empty()) {
            return role.clone();
        }

        self.realm_access
            .as_ref()
            .and_then(|access| {
                access.roles.iter().find(|r| {
                    !DEFAULT_ROLES.contains(&r.as_str()) && !r.starts_with(DEFAULT_ROLES_PREFIX)
                })
            })
            .cloned()
            .unwrap_or_default()
    }
}

/// Checks access token signatures against the provider's key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: &TokenKey, issuer: Option<&str>) -> anyhow::Result<Self> {
        let (key, algorithm) = match key {
            TokenKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            TokenKey::RsaPublicPem(pem) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
        };

        let mut validation = Validation::new(algorithm);
        // Provider tokens are audienced to the provider's own account client.
        validation.validate_aud = false;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    /// Verify signature and claims. With `check_expiry` off, an expired but
    /// otherwise valid token is accepted.
    pub fn verify(&self, token: &str, check_expiry: bool) -> Result<Claims, AppError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = check_expiry;

        let token_data = decode::<Claims>(token, &self.key, &validation).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            AppError::Unauthorized
        })?;

        Ok(token_data.claims)
    }
}
