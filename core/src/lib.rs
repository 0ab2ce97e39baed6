//! payflow-core — an OTP-gated money movement engine over a SQLite ledger.
//!
//! Movement flows: internal transfer, deposit, withdrawal, and utility/bill
//! payment. Every movement writes its balance change and its ledger entry
//! in one store transaction, or not at all; a confirmation code with a
//! bounded validity window gates execution.

pub mod bill;
pub mod clock;
pub mod config;
pub mod error;
pub mod interest;
pub mod model;
pub mod otp;
pub mod session;
pub mod single_sided_engine;
pub mod store;
pub mod transfer_engine;
pub mod types;

pub use error::{EngineError, EngineResult};
