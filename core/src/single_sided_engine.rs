//! Single-sided movement engine — deposit, withdrawal, and utility/bill
//! payment. One real account on one side, a reserved synthetic
//! counterparty on the other.

use crate::{
    bill::BillDirectory,
    clock::Clock,
    error::{EngineError, EngineResult},
    model::{Counterparty, Transaction, TransactionKind, TransactionStatus},
    store::LedgerStore,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct SingleSidedEngine {
    clock: Arc<dyn Clock>,
}

impl SingleSidedEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn validate(&self, account_id: &str, amount: f64) -> EngineResult<()> {
        if !(amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "movement amount must be positive, got {amount}"
            )));
        }
        if !matches!(
            Counterparty::classify(account_id),
            Counterparty::Account(_)
        ) {
            return Err(EngineError::AccountNotFound(account_id.to_string()));
        }
        Ok(())
    }

    /// Credit the account. No balance-sufficiency check applies.
    pub fn deposit(
        &self,
        store: &mut LedgerStore,
        account_id: &str,
        amount: f64,
        memo: &str,
    ) -> EngineResult<Transaction> {
        self.validate(account_id, amount)?;
        let entry = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            sender_account_id: Counterparty::System.ledger_id().to_string(),
            receiver_account_id: account_id.to_string(),
            amount,
            kind: TransactionKind::Deposit,
            status: TransactionStatus::Success,
            timestamp_ms: self.clock.now_ms(),
            description: memo.to_string(),
        };
        store.commit_single_sided(&entry, account_id, amount, false)?;
        log::info!(
            "deposit committed: {} amount {} txn {}",
            account_id,
            amount,
            entry.transaction_id
        );
        Ok(entry)
    }

    /// Debit the account; fails with `InsufficientFunds` before any write
    /// if the balance cannot cover the amount.
    pub fn withdraw(
        &self,
        store: &mut LedgerStore,
        account_id: &str,
        amount: f64,
        memo: &str,
    ) -> EngineResult<Transaction> {
        self.validate(account_id, amount)?;
        let entry = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            sender_account_id: account_id.to_string(),
            receiver_account_id: Counterparty::System.ledger_id().to_string(),
            amount,
            kind: TransactionKind::Withdrawal,
            status: TransactionStatus::Success,
            timestamp_ms: self.clock.now_ms(),
            description: memo.to_string(),
        };
        store.commit_single_sided(&entry, account_id, -amount, true)?;
        log::info!(
            "withdrawal committed: {} amount {} txn {}",
            account_id,
            amount,
            entry.transaction_id
        );
        Ok(entry)
    }

    /// Debit the account toward a utility provider. The movement commit is
    /// atomic; flagging the bill paid afterwards is best-effort — a failure
    /// there is logged and the payment still reports success.
    #[allow(clippy::too_many_arguments)]
    pub fn pay_utility(
        &self,
        store: &mut LedgerStore,
        bills: Option<&mut dyn BillDirectory>,
        account_id: &str,
        amount: f64,
        provider: &str,
        customer_code: &str,
        bill_id: Option<&str>,
        memo: &str,
    ) -> EngineResult<Transaction> {
        self.validate(account_id, amount)?;

        let mut description = memo.to_string();
        if !provider.is_empty() {
            description.push_str(&format!(" - Provider: {provider}"));
        }
        if !customer_code.is_empty() {
            description.push_str(&format!(" - Customer code: {customer_code}"));
        }

        let entry = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            sender_account_id: account_id.to_string(),
            receiver_account_id: Counterparty::Provider.ledger_id().to_string(),
            amount,
            kind: TransactionKind::BillPayment,
            status: TransactionStatus::Success,
            timestamp_ms: self.clock.now_ms(),
            description,
        };
        store.commit_single_sided(&entry, account_id, -amount, true)?;
        log::info!(
            "bill payment committed: {} amount {} provider {} txn {}",
            account_id,
            amount,
            provider,
            entry.transaction_id
        );

        // Secondary step, eventually consistent: the money has moved even
        // if the paid flag cannot be written right now.
        if let Some(bill_id) = bill_id {
            match bills {
                Some(directory) => {
                    if let Err(e) = directory.mark_paid(bill_id, entry.timestamp_ms) {
                        log::warn!(
                            "payment {} succeeded but bill '{}' could not be marked paid: {}",
                            entry.transaction_id,
                            bill_id,
                            e
                        );
                    }
                }
                None => log::warn!(
                    "payment {} succeeded but no bill directory attached; bill '{}' left unpaid",
                    entry.transaction_id,
                    bill_id
                ),
            }
        }
        Ok(entry)
    }
}
