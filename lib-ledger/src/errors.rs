//! Wallet Ledger Errors

use lib_types::{AccountId, Amount, EntryId};
use thiserror::Error;

/// Error during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account already exists: {0}")]
    AccountExists(AccountId),

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Arithmetic overflow")]
    Overflow,

    /// Transient storage failure. Retried with bounded backoff by callers,
    /// never by looping inside the ledger call itself.
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Whether a caller may retry the operation verbatim.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Storage(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
