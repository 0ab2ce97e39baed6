use super::LedgerStore;
use crate::{
    error::{EngineError, EngineResult},
    model::{Account, AccountType},
};
use rusqlite::{params, OptionalExtension, Row};

fn account_row_mapper(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        owner_id: row.get(1)?,
        account_type: row.get(2)?,
        balance: row.get(3)?,
        currency: row.get(4)?,
        interest_rate: row.get(5)?,
        term_months: row.get(6)?,
        principal_amount: row.get(7)?,
    })
}

const ACCOUNT_COLUMNS: &str = "account_id, owner_id, account_type, balance, currency, \
                               interest_rate, term_months, principal_amount";

impl LedgerStore {
    /// Insert or replace: account provisioning writes whole documents.
    pub fn upsert_account(&self, account: &Account) -> EngineResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO account (
                account_id, owner_id, account_type, balance, currency,
                interest_rate, term_months, principal_amount
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                account.account_id,
                account.owner_id,
                account.account_type,
                account.balance,
                account.currency,
                account.interest_rate,
                account.term_months,
                account.principal_amount,
            ],
        )?;
        Ok(())
    }

    pub fn get_account(&self, account_id: &str) -> EngineResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE account_id = ?1"),
                params![account_id],
                account_row_mapper,
            )
            .optional()?;
        Ok(account)
    }

    pub fn account_balance(&self, account_id: &str) -> EngineResult<f64> {
        self.conn
            .query_row(
                "SELECT balance FROM account WHERE account_id = ?1",
                params![account_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))
    }

    pub fn accounts_for_owner(&self, owner_id: &str) -> EngineResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE owner_id = ?1 ORDER BY account_id"
        ))?;
        let rows = stmt.query_map(params![owner_id], account_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Officer flow: set a new rate on every account of one type.
    /// Returns the number of accounts updated.
    pub fn update_interest_rate_for_type(
        &self,
        account_type: AccountType,
        new_rate: f64,
    ) -> EngineResult<usize> {
        let changed = self.conn.execute(
            "UPDATE account SET interest_rate = ?1 WHERE account_type = ?2",
            params![new_rate, account_type],
        )?;
        Ok(changed)
    }
}
