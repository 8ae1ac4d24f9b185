use crate::error::QuillError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session lifetime from issuance.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 session tokens.
///
/// Expiry is checked against the caller's `now`, not the wall clock, so the
/// same token verifies identically in tests and in production.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionTokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is ours to check against the supplied instant
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// `None` or an empty secret means sessions are not configured.
    pub fn from_secret(secret: Option<&str>) -> Option<Self> {
        secret
            .filter(|s| !s.is_empty())
            .map(|s| Self::new(s.as_bytes()))
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<String, QuillError> {
        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| QuillError::SigningFailed(format!("session token: {e}")))
    }

    /// The token's subject, if the signature holds and `now` is not past expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, QuillError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| QuillError::TokenInvalid)?;
        if now.timestamp() > data.claims.exp {
            return Err(QuillError::TokenExpired);
        }
        Ok(data.claims.sub)
    }
}

impl fmt::Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenIssuer").finish_non_exhaustive()
    }
}
