mod common;

use auth_service::domain::user::errors::RepositoryError;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::Name;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::models::UserRecord;
use auth_service::domain::user::ports::UserRepository;
use auth_service::outbound::repositories::PostgresUserRepository;
use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use common::TestDb;

fn record(email: &str, created_at: DateTime<Utc>) -> UserRecord {
    UserRecord {
        user: User {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            name: Name::new("Ada Lovelace".to_string()).unwrap(),
            is_active: true,
            // Postgres keeps microseconds
            created_at: created_at.trunc_subsecs(6),
        },
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
    }
}

#[tokio::test]
async fn test_insert_and_find_round_trip() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let repository = PostgresUserRepository::new(db.pool.clone());

    let inserted = repository
        .insert(record("a@x.com", Utc::now()))
        .await
        .expect("Failed to insert user");

    let by_email = repository
        .find_by_email(&EmailAddress::new("a@x.com".to_string()).unwrap())
        .await
        .expect("find_by_email failed")
        .expect("User not found by email");
    assert_eq!(by_email, inserted);

    let by_id = repository
        .find_by_id(&inserted.user.id)
        .await
        .expect("find_by_id failed")
        .expect("User not found by id");
    assert_eq!(by_id, inserted);

    let missing = repository
        .find_by_id(&UserId::new())
        .await
        .expect("find_by_id failed");
    assert!(missing.is_none());

    db.teardown().await;
}

#[tokio::test]
async fn test_duplicate_email_is_reported() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let repository = PostgresUserRepository::new(db.pool.clone());

    repository
        .insert(record("a@x.com", Utc::now()))
        .await
        .expect("Failed to insert user");

    // Normalised to the same stored value
    let result = repository.insert(record(" A@X.com", Utc::now())).await;
    assert_eq!(
        result,
        Err(RepositoryError::DuplicateEmail("a@x.com".to_string()))
    );

    let all = repository.list_all().await.expect("list_all failed");
    assert_eq!(all.len(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn test_list_all_newest_first() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let repository = PostgresUserRepository::new(db.pool.clone());
    let now = Utc::now();

    repository
        .insert(record("old@x.com", now - Duration::hours(2)))
        .await
        .unwrap();
    repository
        .insert(record("new@x.com", now))
        .await
        .unwrap();
    repository
        .insert(record("mid@x.com", now - Duration::hours(1)))
        .await
        .unwrap();

    let emails: Vec<String> = repository
        .list_all()
        .await
        .expect("list_all failed")
        .into_iter()
        .map(|record| record.user.email.to_string())
        .collect();

    assert_eq!(emails, vec!["new@x.com", "mid@x.com", "old@x.com"]);

    db.teardown().await;
}

#[tokio::test]
async fn test_corrupt_row_is_a_database_error() {
    let Some(db) = TestDb::create().await else {
        return;
    };
    let repository = PostgresUserRepository::new(db.pool.clone());
    let id = uuid::Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, is_active, created_at)
        VALUES ($1, 'not-an-email', 'Ada', 'hash', TRUE, NOW())
        "#,
    )
    .bind(id)
    .execute(&db.pool)
    .await
    .expect("Failed to insert raw row");

    let result = repository.find_by_id(&UserId(id)).await;
    assert!(matches!(result, Err(RepositoryError::Database(_))));

    db.teardown().await;
}
