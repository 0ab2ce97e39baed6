//! Ledger entries and the atomic movement commits.
//!
//! Both commit paths open one IMMEDIATE transaction, re-read the
//! authoritative balances inside it, apply every write, and commit.
//! A precondition failure or lock conflict aborts with zero effect,
//! so a failed commit is always safe to retry.

use super::{map_commit_err, LedgerStore};
use crate::{
    error::{EngineError, EngineResult},
    model::Transaction,
};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

fn entry_row_mapper(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        sender_account_id: row.get(1)?,
        receiver_account_id: row.get(2)?,
        amount: row.get(3)?,
        kind: row.get(4)?,
        status: row.get(5)?,
        timestamp_ms: row.get(6)?,
        description: row.get(7)?,
    })
}

const ENTRY_COLUMNS: &str = "transaction_id, sender_account_id, receiver_account_id, amount, \
                             kind, status, timestamp_ms, description";

fn insert_entry(tx: &rusqlite::Transaction<'_>, entry: &Transaction) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO ledger_entry (
            transaction_id, sender_account_id, receiver_account_id, amount,
            kind, status, timestamp_ms, description
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.transaction_id,
            entry.sender_account_id,
            entry.receiver_account_id,
            entry.amount,
            entry.kind,
            entry.status,
            entry.timestamp_ms,
            entry.description,
        ],
    )?;
    Ok(())
}

fn balance_in_tx(tx: &rusqlite::Transaction<'_>, account_id: &str) -> EngineResult<f64> {
    tx.query_row(
        "SELECT balance FROM account WHERE account_id = ?1",
        params![account_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))
}

impl LedgerStore {
    /// Two-sided commit: debit sender, credit receiver, insert the entry.
    /// All three writes land or none do.
    pub fn commit_transfer(&mut self, entry: &Transaction) -> EngineResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_commit_err)?;

        let sender_balance = balance_in_tx(&tx, &entry.sender_account_id)?;
        // Receiver must exist before any write happens.
        balance_in_tx(&tx, &entry.receiver_account_id)?;

        if sender_balance < entry.amount {
            return Err(EngineError::InsufficientFunds {
                account_id: entry.sender_account_id.clone(),
                balance: sender_balance,
                requested: entry.amount,
            });
        }

        tx.execute(
            "UPDATE account SET balance = balance - ?1 WHERE account_id = ?2",
            params![entry.amount, entry.sender_account_id],
        )?;
        tx.execute(
            "UPDATE account SET balance = balance + ?1 WHERE account_id = ?2",
            params![entry.amount, entry.receiver_account_id],
        )?;
        insert_entry(&tx, entry)?;

        tx.commit().map_err(map_commit_err)
    }

    /// One-sided commit: apply `delta` to one real account and insert the
    /// entry, in one transaction. `require_funds` enforces the
    /// no-negative-balance rule for debits; deposits pass false.
    pub fn commit_single_sided(
        &mut self,
        entry: &Transaction,
        account_id: &str,
        delta: f64,
        require_funds: bool,
    ) -> EngineResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_commit_err)?;

        let balance = balance_in_tx(&tx, account_id)?;
        if require_funds && balance < entry.amount {
            return Err(EngineError::InsufficientFunds {
                account_id: account_id.to_string(),
                balance,
                requested: entry.amount,
            });
        }

        tx.execute(
            "UPDATE account SET balance = balance + ?1 WHERE account_id = ?2",
            params![delta, account_id],
        )?;
        insert_entry(&tx, entry)?;

        tx.commit().map_err(map_commit_err)
    }

    /// All entries touching one participant (either side), newest first.
    pub fn transactions_for_participant(
        &self,
        participant_id: &str,
    ) -> EngineResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entry
             WHERE sender_account_id = ?1 OR receiver_account_id = ?1
             ORDER BY timestamp_ms DESC, transaction_id DESC"
        ))?;
        let rows = stmt.query_map(params![participant_id], entry_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_transaction(&self, transaction_id: &str) -> EngineResult<Option<Transaction>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM ledger_entry WHERE transaction_id = ?1"),
                params![transaction_id],
                entry_row_mapper,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn transaction_count(&self) -> EngineResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM ledger_entry", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
