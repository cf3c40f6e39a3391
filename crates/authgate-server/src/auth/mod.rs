mod jwt;
mod middleware;

pub use jwt::{Claims, TokenVerifier};
pub use middleware::{require_auth, require_session, AuthUser};
