use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Session token claims.
///
/// Carries only the subject identifier and the RFC 7519 time claims.
/// Tokens are signed, not encrypted, so nothing confidential belongs here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject, issued now and expiring after `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique subject identifier
    /// * `ttl` - Lifetime of the token; zero or negative yields an already expired token
    ///
    /// # Errors
    /// * `EncodingFailed` - `ttl` puts the expiry outside the representable time range
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("Token lifetime out of range: {}", ttl))
        })?;

        Ok(Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Check if the claims are expired at the given time.
    ///
    /// A token is valid strictly before its `exp` instant.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
