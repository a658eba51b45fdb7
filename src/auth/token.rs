//! Session tokens
//!
//! HS256 JWTs carrying the user's id, email, and name. No refresh; clients
//! re-authenticate after expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::db::PublicUser;

/// Token lifetime used when none is configured
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Longest accepted token lifetime
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    pub fn user(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signs and verifies session tokens with a shared secret
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// `ttl_days` is clamped to `1..=MAX_TOKEN_TTL_DAYS`
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::days(ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS)),
        }
    }

    /// Issue a token for `user`, expiring after the configured lifetime
    pub fn issue(&self, user: &PublicUser) -> Result<String, AuthError> {
        let now = Utc::now();
        self.sign(&Claims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> PublicUser {
        PublicUser {
            id: 42,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(b"secret", DEFAULT_TOKEN_TTL_DAYS);
        let token = issuer.issue(&ann()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "ann@example.com");
        assert_eq!(claims.name, "Ann");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
        assert_eq!(claims.user(), ann());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenIssuer::new(b"secret", 7);
        let other = TokenIssuer::new(b"other-secret", 7);
        let token = other.issue(&ann()).unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(b"secret", 7);
        let past = Utc::now() - Duration::days(1);
        let token = issuer
            .sign(&Claims {
                id: 1,
                email: "old@example.com".to_string(),
                name: "Old".to_string(),
                iat: (past - Duration::days(7)).timestamp(),
                exp: past.timestamp(),
            })
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        let issuer = TokenIssuer::new(b"secret", i64::MAX);
        let claims = issuer.verify(&issuer.issue(&ann()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_DAYS * 24 * 60 * 60);

        let issuer = TokenIssuer::new(b"secret", -5);
        let claims = issuer.verify(&issuer.issue(&ann()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = TokenIssuer::new(b"secret", 7);
        assert!(issuer.verify("not.a.jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
