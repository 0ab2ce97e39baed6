use super::LedgerStore;
use crate::{
    error::{EngineError, EngineResult},
    model::{Bill, BillStatus},
    types::TimestampMs,
};
use rusqlite::{params, OptionalExtension, Row};

fn bill_row_mapper(row: &Row<'_>) -> rusqlite::Result<Bill> {
    Ok(Bill {
        bill_id: row.get(0)?,
        bill_code: row.get(1)?,
        bill_type: row.get(2)?,
        customer_name: row.get(3)?,
        customer_code: row.get(4)?,
        provider: row.get(5)?,
        amount: row.get(6)?,
        status: row.get(7)?,
        due_date_ms: row.get(8)?,
        paid_at_ms: row.get(9)?,
        description: row.get(10)?,
    })
}

const BILL_COLUMNS: &str = "bill_id, bill_code, bill_type, customer_name, customer_code, \
                            provider, amount, status, due_date_ms, paid_at_ms, description";

impl LedgerStore {
    pub fn insert_bill(&self, bill: &Bill) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO bill (
                bill_id, bill_code, bill_type, customer_name, customer_code,
                provider, amount, status, due_date_ms, paid_at_ms, description
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                bill.bill_id,
                bill.bill_code,
                bill.bill_type,
                bill.customer_name,
                bill.customer_code,
                bill.provider,
                bill.amount,
                bill.status,
                bill.due_date_ms,
                bill.paid_at_ms,
                bill.description,
            ],
        )?;
        Ok(())
    }

    pub fn lookup_bill(&self, bill_code: &str) -> EngineResult<Option<Bill>> {
        let bill = self
            .conn
            .query_row(
                &format!("SELECT {BILL_COLUMNS} FROM bill WHERE bill_code = ?1"),
                params![bill_code],
                bill_row_mapper,
            )
            .optional()?;
        Ok(bill)
    }

    pub fn get_bill(&self, bill_id: &str) -> EngineResult<Option<Bill>> {
        let bill = self
            .conn
            .query_row(
                &format!("SELECT {BILL_COLUMNS} FROM bill WHERE bill_id = ?1"),
                params![bill_id],
                bill_row_mapper,
            )
            .optional()?;
        Ok(bill)
    }

    pub fn mark_bill_paid(&self, bill_id: &str, paid_at_ms: TimestampMs) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE bill SET status = ?1, paid_at_ms = ?2 WHERE bill_id = ?3",
            params![BillStatus::Paid, paid_at_ms, bill_id],
        )?;
        if changed == 0 {
            return Err(EngineError::Validation(format!(
                "bill '{bill_id}' not found"
            )));
        }
        Ok(())
    }
}
