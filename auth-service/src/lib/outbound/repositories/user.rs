use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Name;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRecord;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RepositoryError;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt =
            move |e: String| RepositoryError::Database(format!("Corrupt user row {}: {}", id, e));

        Ok(UserRecord {
            user: User {
                id: UserId(id),
                email: EmailAddress::new(row.email).map_err(|e| corrupt(e.to_string()))?,
                name: Name::new(row.name).map_err(|e| corrupt(e.to_string()))?,
                is_active: row.is_active,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.user.id.0)
        .bind(record.user.email.as_str())
        .bind(record.user.name.as_str())
        .bind(&record.password_hash)
        .bind(record.user.is_active)
        .bind(record.user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
                {
                    return RepositoryError::DuplicateEmail(record.user.email.to_string());
                }
            }
            database_error(e)
        })?;

        Ok(record)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(UserRecord::try_from)
        .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(UserRecord::try_from)
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, is_active, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?
        .into_iter()
        .map(UserRecord::try_from)
        .collect()
    }
}
