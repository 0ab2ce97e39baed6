//! Balance transfer engine — all-or-nothing movement between two real
//! accounts.
//!
//! The balance check runs inside the store commit, not here: the optimistic
//! pre-check a session may have done at draft time cannot close the race
//! between check and commit, so the commit re-reads and re-verifies.

use crate::{
    clock::Clock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    model::{Counterparty, Transaction, TransactionKind, TransactionStatus},
    store::LedgerStore,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct TransferEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl TransferEngine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Move `amount` from sender to receiver and record one ledger entry,
    /// atomically. No side effects unless the commit succeeds in full.
    pub fn transfer(
        &self,
        store: &mut LedgerStore,
        sender_id: &str,
        receiver_id: &str,
        amount: f64,
        memo: &str,
    ) -> EngineResult<Transaction> {
        if !(amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "transfer amount must be positive, got {amount}"
            )));
        }
        if sender_id == receiver_id && !self.config.allow_self_transfer {
            return Err(EngineError::Validation(
                "sender and receiver are the same account".to_string(),
            ));
        }
        // Reserved synthetic ids are not transferable accounts.
        for id in [sender_id, receiver_id] {
            if !matches!(Counterparty::classify(id), Counterparty::Account(_)) {
                return Err(EngineError::AccountNotFound(id.to_string()));
            }
        }

        let entry = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            sender_account_id: sender_id.to_string(),
            receiver_account_id: receiver_id.to_string(),
            amount,
            kind: TransactionKind::TransferInternal,
            status: TransactionStatus::Success,
            timestamp_ms: self.clock.now_ms(),
            description: memo.to_string(),
        };
        store.commit_transfer(&entry)?;
        log::info!(
            "transfer committed: {} -> {} amount {} txn {}",
            sender_id,
            receiver_id,
            amount,
            entry.transaction_id
        );
        Ok(entry)
    }
}
