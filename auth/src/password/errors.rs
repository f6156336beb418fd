use thiserror::Error;

/// Error type for password operations.
///
/// Neither variant is a user-facing condition: a wrong password is
/// `Ok(false)`, not an error.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is unreadable: {0}")]
    InvalidHash(String),
}
