//! Signed session tokens.
//!
//! A session token is an HS256 JWT whose `sub` claim is the user id. It is
//! verified without any server-side state; revocation happens only through
//! expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use playtech_core::UserId;

/// How long an issued session stays valid.
pub const SESSION_TTL: Duration = Duration::days(7);

/// Errors from issuing or verifying session tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, structure, or claims did not verify.
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The `sub` claim is not a user id.
    #[error("session token subject is not a user id")]
    BadSubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// A freshly issued token and the instant it stops verifying.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens with a shared secret.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens").finish_non_exhaustive()
    }
}

impl SessionTokens {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Sign a token for `user_id`, valid for [`SESSION_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<SessionToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<SessionToken, TokenError> {
        let expires_at = now + SESSION_TTL;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let value = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(SessionToken { value, expires_at })
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] for a bad signature, an expired or malformed
    /// token, or a non-numeric subject.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::BadSubject)
    }
}
