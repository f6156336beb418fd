use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::SignInResult;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRecord;
use crate::user::errors::AuthError;
use crate::user::errors::RepositoryError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for authentication operations.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    check_token_ttl: Duration,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password hasher and token issuer sharing the process secret
    /// * `check_token_ttl` - Lifetime of tokens re-issued by `reissue_token`
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        check_token_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            authenticator,
            check_token_ttl,
        }
    }

    fn issue_session(&self, user: User) -> Result<SignInResult, AuthError> {
        let token = self.authenticator.issue_token(user.id).map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Token signing failed");
            AuthError::Internal(format!("Token signing failed: {}", e))
        })?;

        Ok(SignInResult { user, token })
    }

    /// Run Argon2 work on the blocking pool so it never stalls the async workers.
    async fn with_hasher<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || work(&authenticator))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password worker failed");
                AuthError::Internal(format!("Password worker failed: {}", e))
            })
    }
}

fn storage_failure(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
        RepositoryError::Database(detail) => {
            tracing::error!(error = %detail, "Credential store failure");
            AuthError::Internal(detail)
        }
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, AuthError> {
        let password = command.password.expose().to_string();
        let password_hash = self
            .with_hasher(move |authenticator| authenticator.hash_password(&password))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::Internal(format!("Password hashing failed: {}", e))
            })?;

        let record = UserRecord {
            user: User {
                id: UserId::new(),
                email: command.email,
                name: command.name,
                is_active: true,
                created_at: Utc::now(),
            },
            password_hash,
        };

        let created = self
            .repository
            .insert(record)
            .await
            .map_err(storage_failure)?
            .into_user();

        tracing::info!(user_id = %created.id, "User created");

        Ok(created)
    }

    async fn register(&self, command: CreateUserCommand) -> Result<SignInResult, AuthError> {
        // The password was hashed a moment ago; issue from the new id instead of re-verifying.
        let user = self.create_user(command).await?;
        self.issue_session(user)
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<SignInResult, AuthError> {
        let Some(record) = self
            .repository
            .find_by_email(&credentials.email)
            .await
            .map_err(storage_failure)?
        else {
            // Same Argon2 cost as a wrong password, so timing does not reveal the email
            let password = credentials.password;
            self.with_hasher(move |authenticator| authenticator.verify_decoy(&password))
                .await?;
            tracing::debug!("Sign-in rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = credentials.password;
        let stored_hash = record.password_hash.clone();
        let user_id = record.user.id;
        let result = self
            .with_hasher(move |authenticator| {
                authenticator.authenticate(&password, &stored_hash, user_id)
            })
            .await?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::debug!(user_id = %record.user.id, "Sign-in rejected: wrong password");
                    AuthError::InvalidCredentials
                }
                other => {
                    tracing::error!(user_id = %record.user.id, error = %other, "Sign-in failed");
                    AuthError::Internal(other.to_string())
                }
            })?;

        tracing::info!(user_id = %record.user.id, "User signed in");

        Ok(SignInResult {
            user: record.into_user(),
            token: result.access_token,
        })
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<User, AuthError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(storage_failure)?
            .map(UserRecord::into_user)
            .ok_or(AuthError::NotFound(id.to_string()))
    }

    async fn reissue_token(&self, user: User) -> Result<SignInResult, AuthError> {
        let token = self
            .authenticator
            .issue_token_with_ttl(user.id, self.check_token_ttl)
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token signing failed");
                AuthError::Internal(format!("Token signing failed: {}", e))
            })?;

        Ok(SignInResult { user, token })
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self
            .repository
            .list_all()
            .await
            .map_err(storage_failure)?
            .into_iter()
            .map(UserRecord::into_user)
            .collect())
    }
}
