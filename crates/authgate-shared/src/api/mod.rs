mod auth;
mod envelope;

pub use auth::*;
pub use envelope::*;
