use std::collections::HashSet;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT token handler for issuing and verifying session tokens.
///
/// Uses HS256 (HMAC with SHA-256). The secret is fixed at construction and
/// never re-read; the default lifetime applies to [`JwtHandler::issue`].
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `default_ttl` - Lifetime given to tokens issued without an explicit one
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            default_ttl,
        }
    }

    /// Lifetime used by [`JwtHandler::issue`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` with the default lifetime.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    /// Issue a token for `subject` expiring after `ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or `ttl` is out of range
    pub fn issue_with_ttl(&self, subject: impl ToString, ttl: Duration) -> Result<String, JwtError> {
        self.encode(&Claims::for_subject(subject, ttl)?)
    }

    /// Encode prepared claims into a signed JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// The signature is checked before expiry, so a forged token never
    /// reports `Expired`.
    ///
    /// # Errors
    /// * `InvalidSignature` - MAC does not match the shared secret
    /// * `Expired` - Current time is at or past `exp`
    /// * `Malformed` - Token cannot be parsed, uses another algorithm, or lacks `sub`/`exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below with zero leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "exp".to_string()]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    _ => JwtError::Malformed(e.to_string()),
                }
            })?;

        if token_data.claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_verify() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));

        let token = handler.issue("user123").expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn test_issue_with_explicit_ttl() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));

        let token = handler
            .issue_with_ttl("user123", Duration::seconds(30))
            .expect("Failed to issue token");

        let claims = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.exp - claims.iat, 30);
    }

    #[test]
    fn test_verify_zero_ttl_is_expired() {
        let handler = JwtHandler::new(SECRET, Duration::zero());

        let token = handler.issue("user123").expect("Failed to issue token");

        assert_eq!(handler.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_elapsed_token_is_expired() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));

        let token = handler
            .issue_with_ttl("user123", Duration::hours(-1))
            .expect("Failed to issue token");

        assert_eq!(handler.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!", Duration::minutes(10));
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!", Duration::minutes(10));

        let token = handler1.issue("user123").expect("Failed to issue token");

        assert_eq!(handler2.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_wins_over_expiry() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!", Duration::zero());
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!", Duration::zero());

        let token = handler1.issue("user123").expect("Failed to issue token");

        assert_eq!(handler2.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_garbage_is_malformed() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));

        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_tampered_payload() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));
        let token = handler.issue("user123").expect("Failed to issue token");
        let other = handler.issue("attacker").expect("Failed to issue token");

        // Splice the payload of one token onto the signature of another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(handler.verify(&forged), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_issue_with_huge_ttl_fails_instead_of_panicking() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(1_000_000_000_000));

        assert!(matches!(
            handler.issue("user123"),
            Err(JwtError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_verify_rejects_other_algorithm() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));
        let claims = Claims::for_subject("user123", Duration::minutes(10)).unwrap();

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(handler.verify(&token), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_rejects_missing_subject() {
        let handler = JwtHandler::new(SECRET, Duration::minutes(10));
        let payload = serde_json::json!({
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 600,
        });

        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(handler.verify(&token), Err(JwtError::Malformed(_))));
    }
}
