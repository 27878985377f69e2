//! Referral Errors

use lib_types::AccountId;
use thiserror::Error;

/// Error during referral graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferralError {
    #[error("Referrer already set for {0}")]
    AlreadySet(AccountId),

    #[error("Setting {referrer} as referrer of {user} would create a cycle")]
    CycleDetected { user: AccountId, referrer: AccountId },

    /// The entry handed to the commission engine is not a completed deposit
    #[error("Entry is not a commissionable deposit: {0}")]
    NotCommissionable(String),

    /// Transient storage failure
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

/// Result type for referral operations
pub type ReferralResult<T> = Result<T, ReferralError>;
