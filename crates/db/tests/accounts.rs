//! Account table behaviour: uniqueness and create-if-absent.

mod common;

use std::time::Duration;

use sightline_core::accounts::{ANONYMOUS_CREDENTIAL, ANONYMOUS_USERNAME};
use sightline_db::models::account::CreateAccount;
use sightline_db::repositories::AccountRepo;
use sqlx::SqlitePool;

fn anonymous() -> CreateAccount {
    CreateAccount {
        username: ANONYMOUS_USERNAME.to_string(),
        credential_hash: ANONYMOUS_CREDENTIAL.to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_username_is_a_unique_violation(pool: SqlitePool) {
    common::create_account(&pool, "alice").await;

    let err = AccountRepo::create(
        &pool,
        &CreateAccount {
            username: "alice".into(),
            credential_hash: "other".into(),
        },
    )
    .await
    .expect_err("second insert must fail");

    assert!(sightline_db::is_unique_violation(&err), "got {err:?}");
    assert_eq!(AccountRepo::count_by_username(&pool, "alice").await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn usernames_are_case_sensitive(pool: SqlitePool) {
    let lower = common::create_account(&pool, "alice").await;
    let upper = common::create_account(&pool, "Alice").await;
    assert_ne!(lower, upper);
}

#[sqlx::test(migrations = "./migrations")]
async fn create_if_absent_is_idempotent(pool: SqlitePool) {
    let first = AccountRepo::create_if_absent(&pool, &anonymous()).await.unwrap();
    for _ in 0..5 {
        let again = AccountRepo::create_if_absent(&pool, &anonymous()).await.unwrap();
        assert_eq!(again.id, first.id);
    }
    assert_eq!(
        AccountRepo::count_by_username(&pool, ANONYMOUS_USERNAME).await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn create_if_absent_keeps_existing_credential(pool: SqlitePool) {
    let id = common::create_account(&pool, "bob").await;

    let row = AccountRepo::create_if_absent(
        &pool,
        &CreateAccount {
            username: "bob".into(),
            credential_hash: "replacement".into(),
        },
    )
    .await
    .unwrap();

    assert_eq!(row.id, id);
    assert_eq!(row.credential_hash, "hash-of-bob");
}

#[sqlx::test(migrations = "./migrations")]
async fn find_by_username_is_exact(pool: SqlitePool) {
    let id = common::create_account(&pool, "carol").await;

    let found = AccountRepo::find_by_username(&pool, "carol")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert!(AccountRepo::find_by_username(&pool, "Carol")
        .await
        .unwrap()
        .is_none());
    assert!(AccountRepo::find_by_username(&pool, "nobody")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn create_if_absent_reads_existing_row_while_writer_holds_lock(pool: SqlitePool) {
    let first = AccountRepo::create_if_absent(&pool, &anonymous()).await.unwrap();

    let mut writer = pool.begin().await.unwrap();
    sqlx::query(
        "INSERT INTO accounts (username, credential_hash, created_at)
         VALUES ('writer', 'x', '2024-01-01T00:00:00Z')",
    )
    .execute(&mut *writer)
    .await
    .unwrap();

    let again = tokio::time::timeout(
        Duration::from_secs(1),
        AccountRepo::create_if_absent(&pool, &anonymous()),
    )
    .await
    .expect("existing account should resolve without waiting for the write lock")
    .unwrap();
    assert_eq!(again.id, first.id);

    writer.rollback().await.unwrap();
}
