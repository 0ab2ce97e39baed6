use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid movement: {0}")]
    Validation(String),

    #[error("Insufficient funds in account '{account_id}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        account_id: String,
        balance: f64,
        requested: f64,
    },

    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Store conflict: concurrent commit on the same records, retry the operation")]
    StoreConflict,

    #[error("OTP expired; restart the session to request a new code")]
    OtpExpired,

    #[error("OTP invalid; re-enter the code before it expires")]
    OtpInvalid,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Expected movement rejections: surfaced to the caller as a terminal
    /// session outcome rather than propagated as a fault.
    pub fn is_movement_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::InsufficientFunds { .. }
                | EngineError::AccountNotFound(_)
                | EngineError::StoreConflict
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
