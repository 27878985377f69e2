//! Identifier and amount primitives shared by every Meridian crate.
//!
//! All monetary values are integer **minor units** (e.g. cents). Balances are
//! unsigned; ledger entry amounts are signed. Percentage math uses basis
//! points (10_000 = 100%) so that every computation stays in integer space.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Unsigned monetary value in minor units
pub type Amount = u128;

/// Signed monetary value in minor units (ledger entry amounts)
pub type SignedAmount = i128;

/// Basis points for percentage calculations (10_000 = 100%)
pub type Bps = u32;

/// One hundred percent, in basis points
pub const BPS_SCALE: u128 = 10_000;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Account identifier, assigned once at registration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AccountId(pub u64);

impl AccountId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct-{}", self.0)
    }
}

/// Ledger entry identifier, monotonic and store-assigned
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntryId(pub u64);

impl EntryId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// Stake position identifier, store-assigned
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PositionId(pub u64);

impl PositionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos-{}", self.0)
    }
}

/// Opaque reference to an external payment-processor event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalRef(pub String);

impl ExternalRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// AMOUNT HELPERS
// ============================================================================

/// Apply a basis-point rate to an amount, rounding down.
///
/// Integer-only: deterministic across platforms, no rounding drift.
/// Returns `None` on overflow (only reachable with absurd inputs, but the
/// caller decides how to surface it).
pub fn apply_bps(amount: Amount, rate: Bps) -> Option<Amount> {
    amount.checked_mul(rate as u128).map(|v| v / BPS_SCALE)
}
