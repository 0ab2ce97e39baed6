//! Payment session lifecycle tests.
//!
//! Cover: the Drafting -> AwaitingOtp -> Confirming -> terminal state walk,
//! expiry cancelling a movement before commit, invalid-code re-entry within
//! the window, and confirm idempotence after success.

use payflow_core::{
    clock::ManualClock,
    config::EngineConfig,
    model::{Account, MovementKind, MovementRequest, TransactionKind},
    session::{PaymentSession, SessionState},
    store::LedgerStore,
    EngineError,
};
use std::sync::Arc;

fn build() -> (LedgerStore, PaymentSession, ManualClock) {
    let store = LedgerStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    let clock = ManualClock::new(0);
    let session = PaymentSession::with_seed(EngineConfig::default(), Arc::new(clock.clone()), 7);
    (store, session, clock)
}

fn transfer_request(amount: f64) -> MovementRequest {
    MovementRequest {
        kind: MovementKind::Transfer {
            sender: "acc-a".to_string(),
            receiver: "acc-b".to_string(),
        },
        amount,
        memo: "test transfer".to_string(),
    }
}

fn seed_pair(store: &LedgerStore) {
    store
        .upsert_account(&Account::checking("acc-a", "alice", 1_000_000.0))
        .unwrap();
    store
        .upsert_account(&Account::checking("acc-b", "bob", 500_000.0))
        .unwrap();
}

/// Full happy path: draft, challenge, correct code, confirmed commit.
#[test]
fn confirmed_transfer_commits() {
    let (mut store, mut session, _) = build();
    seed_pair(&store);

    session
        .submit_draft(transfer_request(300_000.0), Some(1_000_000.0))
        .expect("draft accepted");
    assert_eq!(session.state(), SessionState::AwaitingOtp);

    let code = session.issued_code().expect("challenge issued").to_string();
    session.enter_code(&code).unwrap();
    assert_eq!(session.state(), SessionState::Confirming);

    let outcome = session.confirm(&mut store, None).unwrap();
    assert_eq!(outcome, SessionState::Succeeded);
    assert_eq!(store.account_balance("acc-a").unwrap(), 700_000.0);
    assert_eq!(store.account_balance("acc-b").unwrap(), 800_000.0);

    let receipt = session.receipt().expect("receipt present");
    assert_eq!(receipt.kind, TransactionKind::TransferInternal);
    assert!(store
        .get_transaction(&receipt.transaction_id)
        .unwrap()
        .is_some());
}

/// An expired deposit session commits nothing: the host ticker notices the
/// deadline, the session ends Expired, the balance and ledger stay empty.
#[test]
fn expired_session_moves_no_money() {
    let (mut store, mut session, clock) = build();
    store
        .upsert_account(&Account::checking("acc-a", "alice", 0.0))
        .unwrap();

    session
        .submit_draft(
            MovementRequest {
                kind: MovementKind::Deposit {
                    account: "acc-a".to_string(),
                },
                amount: 150_000.0,
                memo: String::new(),
            },
            None,
        )
        .unwrap();

    // Ticker fires every second; nothing happens until the window closes.
    for _ in 0..19 {
        clock.advance_secs(1);
        assert!(!session.expire_if_elapsed());
    }
    clock.advance_secs(1);
    assert!(session.expire_if_elapsed());
    assert_eq!(session.state(), SessionState::Expired);
    assert!(matches!(session.error(), Some(EngineError::OtpExpired)));

    assert_eq!(store.account_balance("acc-a").unwrap(), 0.0);
    assert_eq!(store.transaction_count().unwrap(), 0);
}

/// Expiry wins even on the confirm path: a correct code entered in time
/// but confirmed after the deadline ends Expired, with no commit.
#[test]
fn late_confirm_with_correct_code_expires() {
    let (mut store, mut session, clock) = build();
    seed_pair(&store);

    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    let code = session.issued_code().unwrap().to_string();
    session.enter_code(&code).unwrap();

    clock.advance_secs(20);
    let outcome = session.confirm(&mut store, None).unwrap();
    assert_eq!(outcome, SessionState::Expired);
    assert_eq!(store.account_balance("acc-a").unwrap(), 1_000_000.0);
    assert_eq!(store.transaction_count().unwrap(), 0);
}

/// A wrong code is not terminal: the session stays Confirming and the
/// correct code still works within the same window.
#[test]
fn wrong_code_allows_reentry_within_window() {
    let (mut store, mut session, clock) = build();
    seed_pair(&store);

    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    let code = session.issued_code().unwrap().to_string();
    let wrong = if code == "999999" { "000000" } else { "999999" };

    session.enter_code(wrong).unwrap();
    let outcome = session.confirm(&mut store, None).unwrap();
    assert_eq!(outcome, SessionState::Confirming);
    assert!(matches!(session.error(), Some(EngineError::OtpInvalid)));
    assert_eq!(store.transaction_count().unwrap(), 0);

    clock.advance_secs(5);
    session.enter_code(&code).unwrap();
    let outcome = session.confirm(&mut store, None).unwrap();
    assert_eq!(outcome, SessionState::Succeeded);
    assert_eq!(store.account_balance("acc-a").unwrap(), 900_000.0);
}

/// Confirm after success is a no-op: the challenge is consumed, so a
/// duplicate tap can never double-commit.
#[test]
fn duplicate_confirm_does_not_double_commit() {
    let (mut store, mut session, _) = build();
    seed_pair(&store);

    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    let code = session.issued_code().unwrap().to_string();
    session.enter_code(&code).unwrap();
    assert_eq!(
        session.confirm(&mut store, None).unwrap(),
        SessionState::Succeeded
    );

    assert_eq!(
        session.confirm(&mut store, None).unwrap(),
        SessionState::Succeeded
    );
    assert_eq!(store.transaction_count().unwrap(), 1);
    assert_eq!(store.account_balance("acc-a").unwrap(), 900_000.0);
    assert!(session.issued_code().is_none());
}

/// A store-side rejection at commit time (stale known balance) ends the
/// session Failed, not Err: it is an expected outcome, not a fault.
#[test]
fn commit_rejection_is_terminal_failed() {
    let (mut store, mut session, _) = build();
    seed_pair(&store);

    // The caller thinks there is plenty; the store knows better.
    session
        .submit_draft(transfer_request(2_000_000.0), None)
        .unwrap();
    let code = session.issued_code().unwrap().to_string();
    session.enter_code(&code).unwrap();

    let outcome = session.confirm(&mut store, None).unwrap();
    assert_eq!(outcome, SessionState::Failed);
    assert!(matches!(
        session.error(),
        Some(EngineError::InsufficientFunds { .. })
    ));
    assert_eq!(store.account_balance("acc-a").unwrap(), 1_000_000.0);
    assert_eq!(store.transaction_count().unwrap(), 0);

    // Duplicate taps on a Failed session report Failed, like every other
    // terminal state, and never re-run the movement.
    assert_eq!(
        session.confirm(&mut store, None).unwrap(),
        SessionState::Failed
    );
    assert_eq!(store.transaction_count().unwrap(), 0);
}

/// The optimistic pre-check at draft time rejects an amount over the
/// caller-provided balance before any challenge is issued.
#[test]
fn draft_precheck_rejects_known_overdraft() {
    let (_, mut session, _) = build();

    let err = session
        .submit_draft(transfer_request(2_000_000.0), Some(1_000_000.0))
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));
    assert_eq!(session.state(), SessionState::Drafting);
    assert!(session.issued_code().is_none());
}

/// reset() returns any session, terminal or live, to a clean Drafting
/// state with no challenge or receipt.
#[test]
fn reset_clears_session_state() {
    let (mut store, mut session, clock) = build();
    seed_pair(&store);

    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    clock.advance_secs(25);
    session.expire_if_elapsed();
    assert_eq!(session.state(), SessionState::Expired);

    session.reset();
    assert_eq!(session.state(), SessionState::Drafting);
    assert!(session.error().is_none());
    assert!(session.receipt().is_none());
    assert_eq!(session.remaining_seconds(), 0);

    // And the reset session is fully usable again.
    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    let code = session.issued_code().unwrap().to_string();
    session.enter_code(&code).unwrap();
    assert_eq!(
        session.confirm(&mut store, None).unwrap(),
        SessionState::Succeeded
    );
}

/// Only one movement per session: a second draft without reset is refused.
#[test]
fn second_draft_without_reset_is_refused() {
    let (_, mut session, _) = build();

    session
        .submit_draft(transfer_request(100_000.0), None)
        .unwrap();
    let err = session
        .submit_draft(transfer_request(50_000.0), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
