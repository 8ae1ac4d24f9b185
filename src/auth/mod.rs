//! User credential handling: password hashing and session tokens.

pub mod password;
pub mod session;

pub use password::PasswordAuthority;
pub use session::{SessionClaims, SessionTokenIssuer};
