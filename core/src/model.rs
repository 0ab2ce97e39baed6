//! Domain records: accounts, ledger entries, bills, and movement requests.
//!
//! A `Transaction` is immutable once written. Exactly one is created per
//! successfully executed movement, in the same store commit as the balance
//! writes — never before, never after.

use crate::types::{AccountId, OwnerId, TimestampMs, TransactionId};
use serde::{Deserialize, Serialize};

/// Reserved counterparty id for deposits and withdrawals.
pub const SYSTEM_COUNTERPARTY: &str = "SYSTEM";
/// Reserved counterparty id for utility/bill payments.
pub const UTILITY_COUNTERPARTY: &str = "UTILITY_PROVIDER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Saving,
    Mortgage,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Saving => "SAVING",
            Self::Mortgage => "MORTGAGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CHECKING" => Some(Self::Checking),
            "SAVING" => Some(Self::Saving),
            "MORTGAGE" => Some(Self::Mortgage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub owner_id: OwnerId,
    pub account_type: AccountType,
    /// Whole currency units. Only ever mutated by one engine commit per
    /// confirmed session; never driven below zero by a debit.
    pub balance: f64,
    pub currency: String,
    pub interest_rate: Option<f64>,
    pub term_months: Option<u32>,
    pub principal_amount: Option<f64>,
}

impl Account {
    /// A plain checking account; the common case in tests and seeding.
    pub fn checking(account_id: &str, owner_id: &str, balance: f64) -> Self {
        Self {
            account_id: account_id.to_string(),
            owner_id: owner_id.to_string(),
            account_type: AccountType::Checking,
            balance,
            currency: "VND".to_string(),
            interest_rate: None,
            term_months: None,
            principal_amount: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    TransferInternal,
    TransferExternal,
    BillPayment,
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransferInternal => "TRANSFER_INTERNAL",
            Self::TransferExternal => "TRANSFER_EXTERNAL",
            Self::BillPayment => "BILL_PAYMENT",
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRANSFER_INTERNAL" => Some(Self::TransferInternal),
            "TRANSFER_EXTERNAL" => Some(Self::TransferExternal),
            "BILL_PAYMENT" => Some(Self::BillPayment),
            "DEPOSIT" => Some(Self::Deposit),
            "WITHDRAWAL" => Some(Self::Withdrawal),
            _ => None,
        }
    }
}

/// Only completed movements are persisted; failed attempts leave no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub sender_account_id: AccountId,
    pub receiver_account_id: AccountId,
    pub amount: f64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub timestamp_ms: TimestampMs,
    pub description: String,
}

impl Transaction {
    /// Both sides of the movement, for "all transactions touching X" queries.
    pub fn participants(&self) -> [&str; 2] {
        [&self.sender_account_id, &self.receiver_account_id]
    }
}

/// The other side of a movement. Synthetic counterparties are reserved
/// identifiers, never rows in the account table, so balance rules (like the
/// negative-balance check) can never accidentally apply to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counterparty {
    System,
    Provider,
    Account(AccountId),
}

impl Counterparty {
    pub fn ledger_id(&self) -> &str {
        match self {
            Self::System => SYSTEM_COUNTERPARTY,
            Self::Provider => UTILITY_COUNTERPARTY,
            Self::Account(id) => id,
        }
    }

    /// Classify a wire identifier: reserved ids map to their synthetic
    /// variant, everything else is a real account.
    pub fn classify(id: &str) -> Counterparty {
        match id {
            SYSTEM_COUNTERPARTY => Self::System,
            UTILITY_COUNTERPARTY => Self::Provider,
            _ => Self::Account(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Unpaid,
    Paid,
    Overdue,
    Cancelled,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(Self::Unpaid),
            "PAID" => Some(Self::Paid),
            "OVERDUE" => Some(Self::Overdue),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: String,
    pub bill_code: String,
    pub bill_type: String,
    pub customer_name: String,
    pub customer_code: String,
    pub provider: String,
    pub amount: f64,
    pub status: BillStatus,
    pub due_date_ms: TimestampMs,
    pub paid_at_ms: Option<TimestampMs>,
    pub description: String,
}

/// What a caller wants to move, before any OTP gate or commit.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub amount: f64,
    pub memo: String,
}

#[derive(Debug, Clone)]
pub enum MovementKind {
    Transfer {
        sender: AccountId,
        receiver: AccountId,
    },
    Deposit {
        account: AccountId,
    },
    Withdrawal {
        account: AccountId,
    },
    BillPayment {
        account: AccountId,
        provider: String,
        customer_code: String,
        /// Set when the payment settles a bill known to the directory,
        /// so it can be flagged paid after the commit.
        bill_id: Option<String>,
    },
}

impl MovementKind {
    /// The real account this movement debits, if any. Deposits debit nothing.
    pub fn debit_account(&self) -> Option<&AccountId> {
        match self {
            Self::Transfer { sender, .. } => Some(sender),
            Self::Withdrawal { account } | Self::BillPayment { account, .. } => Some(account),
            Self::Deposit { .. } => None,
        }
    }
}
