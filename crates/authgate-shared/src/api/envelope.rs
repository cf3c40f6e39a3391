use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request wrapper posted by the web console.
///
/// Every endpoint receives the same outer shape; only `request` varies.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonRequest<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Map<String, Value>>,
    pub request: T,
}

impl<T> CommonRequest<T> {
    pub fn new(request: T) -> Self {
        Self {
            path_params: None,
            query_params: None,
            request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub code: u16,
    pub message: String,
}

/// Response envelope: `{ "status": { "code", "message" }, "data" }`.
///
/// `status.code` normally mirrors the HTTP status, except for logout which
/// answers HTTP 200 with a 204 envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
}

impl<T> CommonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(200, "OK", Some(data))
    }

    pub fn no_content() -> Self {
        Self::with_status(204, "No Content", None)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(400, message, None)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(401, message, None)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(500, message, None)
    }

    fn with_status(code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: ResponseStatus {
                code,
                message: message.into(),
            },
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status.code)
    }
}

/// Envelope used when there is no payload.
pub type EmptyResponse = CommonResponse<Value>;
