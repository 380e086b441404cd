//! Repository tests against a real PostgreSQL instance.
//!
//! Run with `cargo test -- --ignored` and `DATABASE_URL` pointing at a server
//! that allows creating databases.

mod common;

use std::time::Duration;

use account_service::account::errors::AccountError;
use account_service::account::models::Account;
use account_service::account::models::AccountId;
use account_service::account::models::EmailAddress;
use account_service::account::models::ExternalProfile;
use account_service::account::ports::AccountRepository;
use account_service::repositories::PostgresAccountRepository;
use chrono::Utc;
use common::TestDb;

fn local_account(email: &str) -> Account {
    Account::new_local(
        EmailAddress::parse(email).unwrap(),
        "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        "Ada".to_string(),
        "Lovelace".to_string(),
        Some("England".to_string()),
        "verification".to_string(),
    )
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_and_find() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let created = repository.create(local_account("ada@example.com")).await.unwrap();

    let by_id = repository.find_by_id(&created.id).await.unwrap().unwrap();
    let by_email = repository
        .find_by_email(&EmailAddress::parse("ADA@example.com").unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_id.id, created.id);
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_id.country.as_deref(), Some("England"));
    assert_eq!(by_id.token_version, 0);
    assert!(!by_id.is_email_verified);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_email_maps_to_conflict() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    repository.create(local_account("ada@example.com")).await.unwrap();
    let result = repository.create(local_account("ada@example.com")).await;

    assert!(matches!(result, Err(AccountError::EmailAlreadyExists(_))));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_google_id_maps_to_conflict() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let profile = |email: &str| ExternalProfile {
        provider_id: "google-1".to_string(),
        email: EmailAddress::parse(email).unwrap(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
    };

    repository
        .create(Account::new_external(&profile("grace@example.com")))
        .await
        .unwrap();
    let result = repository
        .create(Account::new_external(&profile("other@example.com")))
        .await;

    assert!(matches!(result, Err(AccountError::GoogleIdAlreadyLinked)));
    let found = repository.find_by_google_id("google-1").await.unwrap().unwrap();
    assert_eq!(found.email.as_str(), "grace@example.com");
    assert!(found.password_hash.is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_and_delete() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let mut account = repository.create(local_account("ada@example.com")).await.unwrap();
    account.is_email_verified = true;
    account.verification_token = None;
    account.token_version += 1;
    account.record_login(Utc::now());

    let updated = repository.update(account).await.unwrap();
    assert!(updated.is_email_verified);
    assert_eq!(updated.token_version, 1);
    assert!(updated.last_login_at.is_some());

    repository.delete(&updated.id).await.unwrap();
    assert!(repository.find_by_id(&updated.id).await.unwrap().is_none());
    assert!(matches!(
        repository.delete(&updated.id).await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_missing_account() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let mut account = local_account("ghost@example.com");
    account.id = AccountId::new();

    assert!(matches!(
        repository.update(account).await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_record_login_only_touches_login_columns() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let created = repository.create(local_account("ada@example.com")).await.unwrap();

    // Password reset committed by another request
    let mut reset = created.clone();
    reset.password_hash = Some("$argon2id$v=19$m=8,t=1,p=1$bmV3c2FsdA$bmV3".to_string());
    reset.token_version = 3;
    repository.update(reset.clone()).await.unwrap();

    repository.record_login(&created.id, Utc::now()).await.unwrap();

    let stored = repository.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.token_version, 3);
    assert_eq!(stored.password_hash, reset.password_hash);
    assert!(stored.last_login_at.is_some());

    assert!(matches!(
        repository.record_login(&AccountId::new(), Utc::now()).await,
        Err(AccountError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_link_google_sets_only_google_columns() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone(), Duration::from_secs(5));

    let created = repository.create(local_account("ada@example.com")).await.unwrap();
    let mut reset = created.clone();
    reset.token_version = 2;
    repository.update(reset).await.unwrap();

    let linked = repository
        .link_google(&created.id, "google-9", Utc::now())
        .await
        .unwrap();

    assert_eq!(linked.google_id.as_deref(), Some("google-9"));
    assert!(linked.is_email_verified);
    assert!(linked.verification_token.is_none());
    assert_eq!(linked.token_version, 2);
    assert_eq!(linked.password_hash, created.password_hash);

    assert!(matches!(
        repository.link_google(&created.id, "google-10", Utc::now()).await,
        Err(AccountError::GoogleIdAlreadyLinked)
    ));

    let other = repository.create(local_account("grace@example.com")).await.unwrap();
    assert!(matches!(
        repository.link_google(&other.id, "google-9", Utc::now()).await,
        Err(AccountError::GoogleIdAlreadyLinked)
    ));
    assert!(matches!(
        repository.link_google(&AccountId::new(), "google-11", Utc::now()).await,
        Err(AccountError::NotFound(_))
    ));
}
