use std::sync::OnceLock;

use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Holds the shared signing secret for the lifetime of the process; share it
/// behind an `Arc` rather than constructing one per request.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    /// Hash checked when there is no stored hash, built on first use
    decoy_hash: OnceLock<String>,
}

const DECOY_PASSWORD: &str = "decoy-password-never-stored";

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `token_ttl` - Default lifetime of issued session tokens
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret, token_ttl),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and generate a session token for `subject`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identifier encoded as the token subject
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be read
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: impl ToString,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(subject)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Run a full password verification whose outcome is discarded.
    ///
    /// Called when no stored hash exists for the claimed identity, so that a
    /// failed lookup costs the same as a wrong password.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self.decoy_hash.get_or_init(|| {
            self.password_hasher
                .hash(DECOY_PASSWORD)
                .unwrap_or_default()
        });
        let _ = self.password_hasher.verify(password, decoy);
    }

    /// Generate a session token without password verification.
    ///
    /// For subjects whose identity was established by other means, such as
    /// a user that was just created.
    pub fn issue_token(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject)
    }

    /// Generate a token with an explicit lifetime.
    pub fn issue_token_with_ttl(
        &self,
        subject: impl ToString,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.jwt_handler.issue_with_ttl(subject, ttl)
    }

    /// Validate and decode a JWT token.
    ///
    /// # Errors
    /// * `InvalidSignature`, `Expired`, or `Malformed` - see [`JwtHandler::verify`]
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Default session token lifetime.
    pub fn token_ttl(&self) -> Duration {
        self.jwt_handler.default_ttl()
    }
}
