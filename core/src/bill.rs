//! Bill collaborator interface.
//!
//! `mark_paid` is best-effort and non-transactional with the money
//! movement: a completed payment is never reversed because the paid flag
//! could not be written.

use crate::{
    error::EngineResult,
    model::Bill,
    store::LedgerStore,
    types::TimestampMs,
};

pub trait BillDirectory {
    fn lookup(&mut self, bill_code: &str) -> EngineResult<Option<Bill>>;
    fn mark_paid(&mut self, bill_id: &str, paid_at_ms: TimestampMs) -> EngineResult<()>;
}

/// The store doubles as the directory when bills live in the same ledger
/// database. Use a separate connection (`reopen` on a shared URI) when the
/// movement commit holds the other one.
impl BillDirectory for LedgerStore {
    fn lookup(&mut self, bill_code: &str) -> EngineResult<Option<Bill>> {
        self.lookup_bill(bill_code)
    }

    fn mark_paid(&mut self, bill_id: &str, paid_at_ms: TimestampMs) -> EngineResult<()> {
        self.mark_bill_paid(bill_id, paid_at_ms)
    }
}
