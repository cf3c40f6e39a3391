use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` extractor whose rejection renders as the 400 envelope instead of
/// axum's plain-text 4xx.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
