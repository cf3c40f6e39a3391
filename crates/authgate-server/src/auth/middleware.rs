use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, routes::AppState};

/// Caller identity, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Requires an unexpired bearer token bound to a live session.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticate(&state, request, next, true).await
}

/// Like [`require_auth`] but tolerates an expired access token, so a client
/// can still reach the refresh endpoint.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticate(&state, request, next, false).await
}

async fn authenticate(
    state: &AppState,
    mut request: Request,
    next: Next,
    check_expiry: bool,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = state.verifier.verify(token, check_expiry)?;

    // A token that is no longer the session's current one was logged out or
    // superseded by a refresh.
    let session = state
        .sessions
        .find_by_access_token(token)
        .await?
        .ok_or_else(|| {
            tracing::debug!("No session for presented access token");
            AppError::Unauthorized
        })?;

    let auth_user = AuthUser {
        user_id: session.user_id,
        username: claims.username(),
        email: claims.email.clone().unwrap_or_default(),
        role: claims.role(),
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
