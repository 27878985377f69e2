//! Meridian Wallet Ledger
//!
//! Owns per-account balance state and the append-only transaction log.
//! Every balance mutation in the system goes through [`WalletLedger::apply`];
//! balances are a cache over the entry log and can always be rebuilt from it.
//!
//! # Key Types
//!
//! - [`WalletLedger`]: the single mutation surface for account balances
//! - [`LedgerEntry`]: immutable, append-only log record
//! - [`Account`]: derived balance snapshot (available / locked / pending)
//! - [`LedgerStore`]: storage seam, with [`MemoryLedgerStore`] for tests and
//!   single-process deployments
//!
//! # Invariants
//!
//! - **L1**: all buckets are non-negative at all times
//! - **L2**: replaying the entry log reconstructs every balance exactly
//! - **L3**: per-account mutation is serialized (lock held across
//!   validate-then-persist); nothing is persisted on a validation failure
//! - **L4**: terminal entries are never edited; reversal is a new offsetting
//!   entry linked by `related_entry_id`

pub mod account;
pub mod entry;
pub mod errors;
pub mod ledger;
pub mod store;

pub use account::Account;
pub use entry::{
    balance_effect, BalanceBucket, BucketDelta, EntryFilter, EntryKind, EntryStatus, LedgerEntry,
    NewEntry,
};
pub use errors::{LedgerError, LedgerResult};
pub use ledger::{payout_maturity, EntryRequest, WalletLedger, PAYOUT_MATURITY_HOURS};
pub use store::{LedgerStore, MemoryLedgerStore};
