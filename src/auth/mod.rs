//! Authentication
//!
//! Password hashing and signed session tokens.
//!
//! - [`password`]: salted Argon2id hashes in PHC string format
//! - [`token`]: HS256 bearer tokens embedding `{id, email, name}`
//!
//! Token verification is stateless. A verified payload is trusted as the
//! caller's identity without re-reading the user table, so tokens cannot be
//! revoked before they expire.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, DEFAULT_TOKEN_TTL_DAYS, MAX_TOKEN_TTL_DAYS};

use thiserror::Error;

/// Errors from hashing and token handling
#[derive(Error, Debug)]
pub enum AuthError {
    /// Hashing failed or a stored hash could not be parsed
    #[error("Password hash error: {0}")]
    Hash(String),

    /// Token could not be signed
    #[error("Token signing error: {0}")]
    Signing(String),

    /// Signature, structure, or expiry check failed
    #[error("Invalid or expired token")]
    InvalidToken,
}
