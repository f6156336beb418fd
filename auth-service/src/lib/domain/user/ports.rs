use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::SignInResult;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRecord;
use crate::user::errors::AuthError;
use crate::user::errors::RepositoryError;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create a new user from validated input.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, name, and password
    ///
    /// # Returns
    /// Created user (no password hash)
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `Internal` - Hashing or storage failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, AuthError>;

    /// Create a new user and issue a session token for it.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `Internal` - Hashing, storage, or signing failed
    async fn register(&self, command: CreateUserCommand) -> Result<SignInResult, AuthError>;

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Internal` - Storage, hash parsing, or signing failed
    async fn sign_in(&self, credentials: Credentials) -> Result<SignInResult, AuthError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Internal` - Storage failed
    async fn find_user_by_id(&self, id: &UserId) -> Result<User, AuthError>;

    /// Issue a fresh short-lived token for an already authenticated user.
    ///
    /// # Errors
    /// * `Internal` - Signing failed
    async fn reissue_token(&self, user: User) -> Result<SignInResult, AuthError>;

    /// Retrieve every user, newest first.
    ///
    /// # Errors
    /// * `Internal` - Storage failed
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;
}

/// Persistence operations for user credentials.
///
/// Implementations enforce email uniqueness.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `Database` - Storage operation failed
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional record (None if not found)
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional record (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepositoryError>;

    /// Retrieve all users, newest first.
    async fn list_all(&self) -> Result<Vec<UserRecord>, RepositoryError>;
}
