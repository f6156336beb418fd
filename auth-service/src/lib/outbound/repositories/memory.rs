use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRecord;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RepositoryError;

/// Process-local credential store.
///
/// Used when no database is configured and by the test suites. Contents are
/// lost on restart.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        // Uniqueness check and insert under one write guard
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|existing| existing.user.email == record.user.email)
        {
            return Err(RepositoryError::DuplicateEmail(
                record.user.email.to_string(),
            ));
        }

        users.insert(record.user.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|record| &record.user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        let mut records: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.user.created_at.cmp(&a.user.created_at));
        Ok(records)
    }
}
