//! Router harness backed by the memory session store and a token-minting fake
//! identity provider.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authgate_server::auth::TokenVerifier;
use authgate_server::config::TokenKey;
use authgate_server::idp::{IdentityProvider, IdpError};
use authgate_server::session::MemorySessionStore;
use authgate_server::{create_router, AppState};
use authgate_shared::api::{CommonRequest, CommonResponse, LoginRequest};
use authgate_shared::TokenSet;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// Users known to the fake provider: id -> (password, display name, email, roles).
fn directory() -> HashMap<&'static str, (&'static str, &'static str, &'static str, Vec<&'static str>)> {
    HashMap::from([
        (
            "alice",
            ("wonderland", "Alice Kim", "alice@example.com", vec!["default-roles-console", "admin"]),
        ),
        (
            "bob",
            ("builder", "Bob Lee", "bob@example.com", vec!["offline_access", "viewer"]),
        ),
    ])
}

pub struct FakeIdp {
    serial: AtomicU64,
    /// Lifetime given to newly minted access tokens; negative mints expired ones.
    pub access_ttl: AtomicI64,
    /// Lifetime reported for refresh tokens; zero or less means offline tokens.
    pub refresh_ttl: AtomicI64,
    /// refresh token -> user id
    refresh_tokens: Mutex<HashMap<String, String>>,
    pub revoked: Mutex<Vec<String>>,
}

impl FakeIdp {
    pub fn new() -> Self {
        Self {
            serial: AtomicU64::new(0),
            access_ttl: AtomicI64::new(300),
            refresh_ttl: AtomicI64::new(1800),
            refresh_tokens: Mutex::new(HashMap::new()),
            revoked: Mutex::new(Vec::new()),
        }
    }

    fn mint(&self, user_id: &str) -> TokenSet {
        let (_, name, email, roles) = directory()[user_id].clone();
        let serial = self.serial.fetch_add(1, Ordering::SeqCst);
        let ttl = self.access_ttl.load(Ordering::SeqCst);

        let access_token = sign(json!({
            "exp": (Utc::now() + Duration::seconds(ttl)).timestamp(),
            "jti": format!("access-{serial}"),
            "sub": format!("sub-{user_id}"),
            "preferred_username": user_id,
            "name": name,
            "email": email,
            "realm_access": {"roles": roles},
        }));
        let refresh_token = format!("refresh-{user_id}-{serial}");

        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.clone(), user_id.to_string());

        TokenSet {
            access_token,
            expires_in: ttl,
            refresh_token,
            refresh_expires_in: self.refresh_ttl.load(Ordering::SeqCst),
            token_type: Some("Bearer".to_string()),
            scope: Some("openid".to_string()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdp {
    async fn password_grant(&self, username: &str, password: &str) -> Result<TokenSet, IdpError> {
        match directory().get(username) {
            Some((expected, ..)) if *expected == password => Ok(self.mint(username)),
            _ => Err(IdpError::Rejected {
                error: "invalid_grant".to_string(),
                description: Some("Invalid user credentials".to_string()),
            }),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, IdpError> {
        let user_id = self.refresh_tokens.lock().unwrap().remove(refresh_token);
        match user_id {
            Some(user_id) => Ok(self.mint(&user_id)),
            None => Err(IdpError::Rejected {
                error: "invalid_grant".to_string(),
                description: Some("Token is not active".to_string()),
            }),
        }
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), IdpError> {
        self.refresh_tokens.lock().unwrap().remove(refresh_token);
        self.revoked.lock().unwrap().push(refresh_token.to_string());
        Ok(())
    }
}

pub fn sign(claims: Value) -> String {
    sign_with(claims, SECRET)
}

pub fn sign_with(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sessions: Arc<MemorySessionStore>,
    pub idp: Arc<FakeIdp>,
}

impl TestApp {
    pub fn new() -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        let idp = Arc::new(FakeIdp::new());
        let state = AppState {
            sessions: sessions.clone(),
            idp: idp.clone(),
            verifier: TokenVerifier::new(&TokenKey::Secret(SECRET.to_string()), None).unwrap(),
        };

        Self {
            router: create_router(state.clone()),
            state,
            sessions,
            idp,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    /// Log in and return the issued token set.
    pub async fn login(&self, id: &str, password: &str) -> TokenSet {
        let (status, body) = self
            .post("/api/auth/login", None, Some(login_body(id, password)))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        let envelope: CommonResponse<TokenSet> = serde_json::from_value(body).unwrap();
        assert!(envelope.is_success());
        envelope.data.unwrap()
    }
}

pub fn login_body(id: &str, password: &str) -> Value {
    serde_json::to_value(CommonRequest::new(LoginRequest {
        id: id.to_string(),
        password: password.to_string(),
    }))
    .unwrap()
}
