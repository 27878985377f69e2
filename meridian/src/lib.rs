//! Meridian — ledger-backed staking and referral platform.
//!
//! This crate assembles the subsystem crates into a single facade:
//!
//! - `lib-ledger`: append-only wallet ledger with replayable balances
//! - `lib-staking`: tiered positions, deterministic daily ROI, the
//!   redundancy-safe accrual scheduler
//! - `lib-referral`: referral forest and five-level commission fan-out
//!
//! [`Platform`] is the entry point; everything an API layer needs hangs off
//! it. The subsystem crates remain usable on their own.

pub mod errors;
pub mod platform;

pub use errors::{PlatformError, PlatformResult};
pub use platform::{DepositOutcome, Platform, PlatformConfig, ReferralStats};

pub use lib_ledger::{
    Account, BalanceBucket, EntryFilter, EntryKind, EntryStatus, LedgerEntry,
};
pub use lib_referral::{CommissionPolicy, CommissionReport};
pub use lib_staking::{AccrualRun, PositionStatus, SchedulerConfig, StakePosition, Tier};
pub use lib_types::{AccountId, Amount, EntryId, ExternalRef, PositionId};
