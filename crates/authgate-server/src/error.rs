use authgate_shared::api::EmptyResponse;
use authgate_shared::ExpiryOutOfRange;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::idp::IdpError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("no user session")]
    NoSession,

    #[error("{0}")]
    IdentityProvider(#[from] IdpError),

    #[error("Invalid token set: {0}")]
    InvalidTokenSet(#[from] ExpiryOutOfRange),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_)
            | AppError::NoSession
            | AppError::IdentityProvider(_)
            | AppError::InvalidTokenSet(_)
            | AppError::Database(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Unauthorized => EmptyResponse::unauthorized(self.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                EmptyResponse::bad_request(self.to_string())
            }
            AppError::IdentityProvider(e) => {
                tracing::error!("Identity provider error: {:?}", e);
                EmptyResponse::bad_request(self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                EmptyResponse::internal("Internal error")
            }
            AppError::InvalidTokenSet(e) => {
                tracing::error!("Identity provider sent unusable expiry: {}", e);
                EmptyResponse::bad_request(self.to_string())
            }
            AppError::Validation(_) | AppError::NoSession => {
                EmptyResponse::bad_request(self.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_is_bad_request_with_message() {
        let (status, body) = render(AppError::Validation("id is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"]["code"], 400);
        assert_eq!(body["status"]["message"], "id is required");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn provider_rejection_text_is_passed_through() {
        let err = AppError::from(IdpError::Rejected {
            error: "invalid_grant".into(),
            description: Some("Invalid user credentials".into()),
        });
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"]["message"], "Invalid user credentials");
    }

    #[tokio::test]
    async fn unauthorized_uses_401_envelope() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"]["code"], 401);
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"]["message"], "Internal error");
    }

    #[tokio::test]
    async fn unusable_expiry_is_bad_request() {
        let err = AppError::from(ExpiryOutOfRange {
            field: "expires_in",
            seconds: i64::MAX,
        });
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["status"]["message"],
            format!("Invalid token set: expires_in of {} seconds is out of range", i64::MAX)
        );
    }

    #[tokio::test]
    async fn missing_session_message() {
        let (status, body) = render(AppError::NoSession).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"]["message"], "no user session");
    }
}
