use authgate_shared::api::{CommonRequest, CommonResponse, EmptyResponse, LoginRequest};
use authgate_shared::{TokenSet, UserInfo};
use axum::{extract::State, Extension, Json};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<CommonRequest<LoginRequest>>,
) -> Result<Json<CommonResponse<TokenSet>>, AppError> {
    let LoginRequest { id, password } = req.request;

    if id.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("id and password are required".to_string()));
    }

    let tokens = state.idp.password_grant(&id, &password).await?;

    // Replaces any session left over from a previous login
    state.sessions.create(&id, &tokens).await?;

    tracing::info!("User {} logged in", id);
    Ok(Json(CommonResponse::ok(tokens)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CommonResponse<TokenSet>>, AppError> {
    let session = state
        .sessions
        .find_by_user_id(&user.user_id)
        .await?
        .ok_or(AppError::NoSession)?;

    let tokens = state
        .idp
        .refresh(&session.refresh_token)
        .await
        .map_err(|e| {
            tracing::error!("Token refresh for {} failed: {}", user.user_id, e);
            e
        })?;

    state.sessions.update_tokens(&user.user_id, &tokens).await?;

    Ok(Json(CommonResponse::ok(tokens)))
}

/// POST /api/auth/logout
///
/// Answers HTTP 200 with a 204 envelope.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EmptyResponse>, AppError> {
    let session = state.sessions.find_by_user_id(&user.user_id).await?;

    let removed = state
        .sessions
        .delete_by_user_id(&user.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Logout for {} failed: {}", user.user_id, e);
            AppError::NoSession
        })?;

    let Some(session) = session.filter(|_| removed > 0) else {
        return Err(AppError::NoSession);
    };

    if let Err(e) = state.idp.revoke(&session.refresh_token).await {
        tracing::warn!("Could not end provider session for {}: {}", user.user_id, e);
    }

    tracing::info!("User {} logged out", user.user_id);
    Ok(Json(EmptyResponse::no_content()))
}

/// GET|POST /api/auth/userinfo
pub async fn userinfo(Extension(user): Extension<AuthUser>) -> Json<CommonResponse<UserInfo>> {
    Json(CommonResponse::ok(UserInfo {
        userid: user.user_id,
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

/// GET|POST /api/auth/validate
///
/// Reaching the handler means the middleware accepted the token.
pub async fn validate() -> Json<EmptyResponse> {
    Json(EmptyResponse::ok(Value::Null))
}
