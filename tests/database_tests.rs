//! Postgres ledger tests. Ignored by default; run them with
//! `TEST_DATABASE_URL=... cargo test --test database_tests -- --ignored`.

use cloud_drive_server::{
    database::Database,
    errors::AppError,
    services::{PgQuotaLedger, Provisioned, QuotaLedger},
};
use std::{env, sync::Arc};
use uuid::Uuid;

async fn setup_ledger() -> PgQuotaLedger {
    let database_url =
        env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set for database tests");

    let db = Database::new(&database_url)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");

    PgQuotaLedger::new(db)
}

fn unique_user() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_provision_and_get_account() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();

    assert_eq!(ledger.provision(&user_id).await.unwrap(), Provisioned::Created);

    let account = ledger.get_account(&user_id).await.unwrap();
    assert_eq!(account.user_id, user_id);
    assert_eq!(account.used_storage, 0);
    assert_eq!(account.total_files, 0);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_provision_is_idempotent() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();

    ledger.provision(&user_id).await.unwrap();
    ledger.apply_delta(&user_id, 1234).await.unwrap();

    assert_eq!(
        ledger.provision(&user_id).await.unwrap(),
        Provisioned::AlreadyExists
    );
    assert_eq!(ledger.get_account(&user_id).await.unwrap().used_storage, 1234);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_apply_delta() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();
    ledger.provision(&user_id).await.unwrap();

    let account = ledger.apply_delta(&user_id, 500).await.unwrap();
    assert_eq!(account.used_storage, 500);
    assert_eq!(account.total_files, 1);

    let account = ledger.apply_delta(&user_id, -200).await.unwrap();
    assert_eq!(account.used_storage, 300);
    assert_eq!(account.total_files, 0);

    // Counters never go negative.
    let account = ledger.apply_delta(&user_id, -10_000).await.unwrap();
    assert_eq!(account.used_storage, 0);
    assert_eq!(account.total_files, 0);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_zero_delta_is_rejected() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();
    ledger.provision(&user_id).await.unwrap();
    ledger.apply_delta(&user_id, 10).await.unwrap();

    assert!(matches!(
        ledger.apply_delta(&user_id, 0).await,
        Err(AppError::Validation(_))
    ));

    let account = ledger.get_account(&user_id).await.unwrap();
    assert_eq!(account.used_storage, 10);
    assert_eq!(account.total_files, 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_unknown_user_is_not_found() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();

    assert!(matches!(
        ledger.get_account(&user_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ledger.apply_delta(&user_id, 5).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_reconcile_overwrites_counters() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();
    ledger.provision(&user_id).await.unwrap();
    ledger.apply_delta(&user_id, 9999).await.unwrap();

    let account = ledger.reconcile(&user_id, 42, 3).await.unwrap();
    assert_eq!(account.used_storage, 42);
    assert_eq!(account.total_files, 3);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_adjust_file_count_moves_only_the_count() {
    let ledger = setup_ledger().await;
    let user_id = unique_user();
    ledger.provision(&user_id).await.unwrap();
    ledger.reconcile(&user_id, 300, 2).await.unwrap();

    let account = ledger.adjust_file_count(&user_id, -1).await.unwrap();
    assert_eq!(account.used_storage, 300);
    assert_eq!(account.total_files, 1);

    let account = ledger.adjust_file_count(&user_id, -5).await.unwrap();
    assert_eq!(account.total_files, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_concurrent_deltas_are_not_lost() {
    let ledger = setup_ledger().await;
    let ledger = Arc::new(ledger);
    let user_id = unique_user();
    ledger.provision(&user_id).await.unwrap();

    let a = {
        let ledger = ledger.clone();
        let user_id = user_id.clone();
        tokio::spawn(async move { ledger.apply_delta(&user_id, 500).await })
    };
    let b = {
        let ledger = ledger.clone();
        let user_id = user_id.clone();
        tokio::spawn(async move { ledger.apply_delta(&user_id, 300).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let account = ledger.get_account(&user_id).await.unwrap();
    assert_eq!(account.used_storage, 800);
    assert_eq!(account.total_files, 2);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_ping() {
    let ledger = setup_ledger().await;
    ledger.ping().await.unwrap();
}
