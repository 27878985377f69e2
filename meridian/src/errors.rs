//! Platform Errors

use lib_ledger::LedgerError;
use lib_referral::ReferralError;
use lib_staking::StakeError;
use thiserror::Error;

/// Error surfaced by the platform facade, wrapping the subsystem that
/// produced it
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Referral(#[from] ReferralError),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
