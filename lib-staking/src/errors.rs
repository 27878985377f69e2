//! Staking Engine Errors

use chrono::{DateTime, Utc};
use lib_ledger::LedgerError;
use lib_types::{Amount, PositionId};
use thiserror::Error;

/// Error during staking operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    #[error("Principal below tier minimum: minimum {minimum}, got {principal}")]
    BelowMinimum { minimum: Amount, principal: Amount },

    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },

    #[error("Position is still locked until {unlocks_at}")]
    StillLocked { unlocks_at: DateTime<Utc> },

    #[error("Position not found: {0}")]
    PositionNotFound(PositionId),

    #[error("Position is not active: {0}")]
    NotActive(PositionId),

    #[error("Ledger rejected the operation: {0}")]
    Ledger(LedgerError),

    /// Transient storage failure in the position store
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl StakeError {
    /// Whether a caller may retry the operation verbatim (scheduler backoff)
    pub fn is_transient(&self) -> bool {
        match self {
            StakeError::Storage(_) => true,
            StakeError::Ledger(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<LedgerError> for StakeError {
    fn from(e: LedgerError) -> Self {
        match e {
            // Surfaced under the staking taxonomy so callers see one shape
            // for "account too short" regardless of which layer caught it.
            LedgerError::InsufficientFunds { have, need } => {
                StakeError::InsufficientFunds { have, need }
            }
            other => StakeError::Ledger(other),
        }
    }
}

/// Result type for staking operations
pub type StakeResult<T> = Result<T, StakeError>;
