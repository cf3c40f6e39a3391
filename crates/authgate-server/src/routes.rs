use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{require_auth, require_session, TokenVerifier};
use crate::handlers::auth as auth_handlers;
use crate::idp::IdentityProvider;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub idp: Arc<dyn IdentityProvider>,
    pub verifier: TokenVerifier,
}

pub fn create_router(state: AppState) -> Router {
    // Public auth routes (no middleware)
    let public_auth_routes = Router::new().route("/login", post(auth_handlers::login));

    // Refresh is reachable with an expired access token
    let refresh_routes = Router::new()
        .route("/refresh", post(auth_handlers::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let protected_auth_routes = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route(
            "/userinfo",
            get(auth_handlers::userinfo).post(auth_handlers::userinfo),
        )
        .route(
            "/validate",
            get(auth_handlers::validate).post(auth_handlers::validate),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let auth_routes = Router::new()
        .merge(public_auth_routes)
        .merge(refresh_routes)
        .merge(protected_auth_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
