//! Account balance snapshot.
//!
//! An [`Account`] is derived state: a cache of the folded entry log for one
//! user. It is never edited directly; `WalletLedger` recomputes it on every
//! applied entry and can rebuild it from the log alone.

use crate::entry::BucketDelta;
use crate::errors::{LedgerError, LedgerResult};
use lib_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// Single unit of account for the platform. Balances are minor units of this
/// currency; the core never mixes currencies.
pub const CURRENCY: &str = "USD";

/// Per-user balance snapshot across the three buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: AccountId,
    /// Spendable / withdrawable funds
    pub available: Amount,
    /// Staked principal, inaccessible until the lock expires
    pub locked: Amount,
    /// Funds held by an in-flight withdrawal request
    pub pending: Amount,
    pub currency: String,
    /// Mutation counter, diagnostic only (resets on rebuild)
    pub version: u64,
}

impl Account {
    pub fn new(user_id: AccountId) -> Self {
        Self {
            user_id,
            available: 0,
            locked: 0,
            pending: 0,
            currency: CURRENCY.to_string(),
            version: 0,
        }
    }

    /// The three buckets, for comparisons that ignore `version`
    pub fn buckets(&self) -> (Amount, Amount, Amount) {
        (self.available, self.locked, self.pending)
    }

    /// Apply a signed delta, failing without mutation if any bucket would go
    /// negative or overflow.
    ///
    /// `InsufficientFunds` carries the bucket that fell short.
    pub fn checked_apply(&self, delta: &BucketDelta) -> LedgerResult<Account> {
        let available = add_signed(self.available, delta.available)?;
        let locked = add_signed(self.locked, delta.locked)?;
        let pending = add_signed(self.pending, delta.pending)?;
        Ok(Account {
            user_id: self.user_id,
            available,
            locked,
            pending,
            currency: self.currency.clone(),
            version: self.version + 1,
        })
    }
}

fn add_signed(balance: Amount, delta: i128) -> LedgerResult<Amount> {
    if delta >= 0 {
        balance
            .checked_add(delta.unsigned_abs())
            .ok_or(LedgerError::Overflow)
    } else {
        let need = delta.unsigned_abs();
        balance
            .checked_sub(need)
            .ok_or(LedgerError::InsufficientFunds {
                have: balance,
                need,
            })
    }
}
