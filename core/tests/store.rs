//! Ledger store tests: document round-trips, owner queries, and the
//! shared-memory URI that lets a second connection see the same ledger.

use payflow_core::{
    clock::ManualClock,
    config::EngineConfig,
    model::{Account, AccountType},
    store::LedgerStore,
    transfer_engine::TransferEngine,
    EngineError,
};
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;

fn build() -> LedgerStore {
    let store = LedgerStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    store
}

/// Every account field survives a write/read round-trip, including the
/// optional saving/mortgage fields.
#[test]
fn account_round_trip_preserves_all_fields() {
    let store = build();
    let account = Account {
        account_id: "mort-1".to_string(),
        owner_id: "alice".to_string(),
        account_type: AccountType::Mortgage,
        balance: 0.0,
        currency: "VND".to_string(),
        interest_rate: Some(0.09),
        term_months: Some(240),
        principal_amount: Some(300_000_000.0),
    };
    store.upsert_account(&account).unwrap();

    let read = store.get_account("mort-1").unwrap().expect("account exists");
    assert_eq!(read.owner_id, "alice");
    assert_eq!(read.account_type, AccountType::Mortgage);
    assert_eq!(read.interest_rate, Some(0.09));
    assert_eq!(read.term_months, Some(240));
    assert_eq!(read.principal_amount, Some(300_000_000.0));
}

/// Upsert replaces the whole document for an existing id.
#[test]
fn upsert_replaces_existing_account() {
    let store = build();
    store
        .upsert_account(&Account::checking("acc-a", "alice", 100.0))
        .unwrap();
    store
        .upsert_account(&Account::checking("acc-a", "alice", 999.0))
        .unwrap();

    assert_eq!(store.account_balance("acc-a").unwrap(), 999.0);
    assert_eq!(store.accounts_for_owner("alice").unwrap().len(), 1);
}

/// Owner queries return only that owner's accounts, in stable id order.
#[test]
fn owner_query_is_scoped_and_ordered() {
    let store = build();
    store
        .upsert_account(&Account::checking("acc-2", "alice", 0.0))
        .unwrap();
    store
        .upsert_account(&Account::checking("acc-1", "alice", 0.0))
        .unwrap();
    store
        .upsert_account(&Account::checking("acc-3", "bob", 0.0))
        .unwrap();

    let accounts = store.accounts_for_owner("alice").unwrap();
    let ids: Vec<&str> = accounts.iter().map(|a| a.account_id.as_str()).collect();
    assert_eq!(ids, vec!["acc-1", "acc-2"]);
}

/// Missing rows come back as None, not errors.
#[test]
fn missing_rows_are_none() {
    let store = build();
    assert!(store.get_account("nope").unwrap().is_none());
    assert!(store.get_transaction("nope").unwrap().is_none());
    assert!(store.get_bill("nope").unwrap().is_none());
    assert!(store.lookup_bill("nope").unwrap().is_none());
}

/// A shared-memory URI gives a second connection a view of the same
/// database, which is how the bill directory rides alongside the ledger.
#[test]
fn shared_memory_uri_is_visible_across_connections() {
    let store =
        LedgerStore::open("file:store_test_shared?mode=memory&cache=shared").expect("open URI");
    store.migrate().expect("migrate");
    store
        .upsert_account(&Account::checking("acc-a", "alice", 42.0))
        .unwrap();

    let second = store.reopen().expect("reopen same database");
    assert_eq!(second.account_balance("acc-a").unwrap(), 42.0);

    second
        .upsert_account(&Account::checking("acc-b", "bob", 7.0))
        .unwrap();
    assert_eq!(store.account_balance("acc-b").unwrap(), 7.0);
}

/// A rival write transaction on a second connection turns the commit into
/// the retryable StoreConflict: balances and the ledger are untouched, and
/// the identical transfer succeeds once the rival releases its lock.
#[test]
fn concurrent_commit_is_a_retryable_conflict() {
    let uri = "file:store_test_conflict?mode=memory&cache=shared";
    let mut store = LedgerStore::open(uri).expect("open URI");
    store.migrate().expect("migrate");
    store
        .upsert_account(&Account::checking("acc-a", "alice", 500_000.0))
        .unwrap();
    store
        .upsert_account(&Account::checking("acc-b", "bob", 0.0))
        .unwrap();
    let engine = TransferEngine::new(EngineConfig::default(), Arc::new(ManualClock::new(0)));

    let rival = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
    )
    .expect("rival connection");
    rival
        .execute_batch(
            "BEGIN IMMEDIATE;
             UPDATE account SET balance = balance + 0 WHERE account_id = 'acc-a';",
        )
        .unwrap();

    let err = engine
        .transfer(&mut store, "acc-a", "acc-b", 100_000.0, "")
        .unwrap_err();
    assert!(matches!(err, EngineError::StoreConflict), "got {err:?}");

    rival.execute_batch("ROLLBACK;").unwrap();
    assert_eq!(store.account_balance("acc-a").unwrap(), 500_000.0);
    assert_eq!(store.account_balance("acc-b").unwrap(), 0.0);
    assert_eq!(store.transaction_count().unwrap(), 0);

    // The same request is safe to retry at the same commit step.
    engine
        .transfer(&mut store, "acc-a", "acc-b", 100_000.0, "")
        .expect("retry succeeds after release");
    assert_eq!(store.account_balance("acc-a").unwrap(), 400_000.0);
    assert_eq!(store.account_balance("acc-b").unwrap(), 100_000.0);
    assert_eq!(store.transaction_count().unwrap(), 1);
}
