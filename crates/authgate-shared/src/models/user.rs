use serde::{Deserialize, Serialize};

/// Identity of the caller as carried in its access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub userid: String,
    pub username: String,
    pub email: String,
    pub role: String,
}
