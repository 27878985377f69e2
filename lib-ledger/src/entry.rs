//! Ledger entry data model and balance-effect computation.
//!
//! A [`LedgerEntry`] is the unit of truth: balances are nothing more than the
//! folded [`BucketDelta`]s of an account's entries. The effect of one entry on
//! the three balance buckets is a pure function of `(kind, bucket, amount,
//! status)` — see [`LedgerEntry::effect`] — and the same function drives both
//! incremental snapshot updates and full replay, so the two cannot diverge in
//! their interpretation of an entry.

use chrono::{DateTime, Utc};
use lib_types::{AccountId, EntryId, ExternalRef, SignedAmount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// External deposit confirmed by the payment processor
    Deposit,
    /// Withdrawal of available funds (direct, or via the pending request flow)
    Withdrawal,
    /// Capital moved from available into a stake position
    Stake,
    /// Stake principal returned to available after the lock expires
    Unstake,
    /// Daily yield credited by the staking engine
    RoiPayout,
    /// Referral commission credited from a downline deposit
    ReferralCommission,
    /// Manual operator adjustment
    AdminAdjustment,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Deposit => "deposit",
            EntryKind::Withdrawal => "withdrawal",
            EntryKind::Stake => "stake",
            EntryKind::Unstake => "unstake",
            EntryKind::RoiPayout => "roi_payout",
            EntryKind::ReferralCommission => "referral_commission",
            EntryKind::AdminAdjustment => "admin_adjustment",
        };
        f.write_str(s)
    }
}

/// Which balance bucket an entry primarily targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceBucket {
    Available,
    Locked,
    Pending,
}

/// Entry lifecycle.
///
/// `Pending -> Completed | Failed | Reversed` are the only transitions.
/// Completed and Failed are terminal. Reversed is reached exactly once, from
/// Pending, atomically with the offsetting entry that cancels the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
}

impl EntryStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

/// Signed per-bucket balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketDelta {
    pub available: SignedAmount,
    pub locked: SignedAmount,
    pub pending: SignedAmount,
}

impl BucketDelta {
    pub const ZERO: BucketDelta = BucketDelta {
        available: 0,
        locked: 0,
        pending: 0,
    };

    fn single(bucket: BalanceBucket, amount: SignedAmount) -> Self {
        let mut delta = BucketDelta::ZERO;
        match bucket {
            BalanceBucket::Available => delta.available = amount,
            BalanceBucket::Locked => delta.locked = amount,
            BalanceBucket::Pending => delta.pending = amount,
        }
        delta
    }

    /// Component-wise difference, used when an entry transitions status:
    /// the snapshot applies `effect(new) - effect(old)`.
    pub fn minus(&self, other: &BucketDelta) -> BucketDelta {
        BucketDelta {
            available: self.available - other.available,
            locked: self.locked - other.locked,
            pending: self.pending - other.pending,
        }
    }
}

/// Immutable, append-only ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Monotonic, store-assigned
    pub id: EntryId,
    pub account_id: AccountId,
    pub kind: EntryKind,
    /// Signed minor units. Credits positive, debits negative; the sign
    /// convention per kind is enforced at application time.
    pub amount: SignedAmount,
    /// Primary bucket the entry targets. For transfer kinds (stake, unstake,
    /// withdrawal requests) the counter-bucket effect is derived from `kind`.
    pub bucket: BalanceBucket,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    /// Links a commission to its originating deposit, or a reversal to the
    /// entry it offsets.
    pub related_entry_id: Option<EntryId>,
    /// Reference delivered by the external confirmation source, if any
    pub external_ref: Option<ExternalRef>,
}

/// An entry as proposed to the store, before an id is assigned
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub account_id: AccountId,
    pub kind: EntryKind,
    pub amount: SignedAmount,
    pub bucket: BalanceBucket,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub related_entry_id: Option<EntryId>,
    pub external_ref: Option<ExternalRef>,
}

/// Contribution of an entry with the given shape to the balance buckets.
///
/// # Effect matrix
///
/// | kind / state | available | locked | pending |
/// |---|---|---|---|
/// | deposit, completed | +a | | |
/// | withdrawal (bucket=available), completed | a (a<0) | | |
/// | withdrawal request (bucket=pending), pending or reversed | a | | -a |
/// | withdrawal request (bucket=pending), completed, a<0 | a | | |
/// | withdrawal reversal (bucket=pending, a>0), completed | a | | -a |
/// | stake, completed | a (a<0) | -a | |
/// | unstake, completed | a (a>0) | -a | |
/// | roi_payout / referral_commission, completed | +a | | |
/// | admin_adjustment, completed | per `bucket` | | |
/// | any, failed | 0 | 0 | 0 |
///
/// A pending withdrawal request holds funds in the pending bucket; once
/// confirmed the hold is released and the funds leave the account, which is
/// why the completed form collapses to an available-only debit. The reversal
/// form (positive amount, appended by `reject_withdrawal_request`) is the
/// exact negation of the hold, and a reversed original keeps its hold effect
/// so the pair nets to zero.
pub fn balance_effect(
    kind: EntryKind,
    bucket: BalanceBucket,
    amount: SignedAmount,
    status: EntryStatus,
) -> BucketDelta {
    let a = amount;
    match status {
        EntryStatus::Failed => BucketDelta::ZERO,
        EntryStatus::Pending | EntryStatus::Reversed => match kind {
            EntryKind::Withdrawal if bucket == BalanceBucket::Pending => BucketDelta {
                available: a,
                locked: 0,
                pending: -a,
            },
            // No other kind is created non-terminal; a foreign pending entry
            // contributes nothing rather than guessing.
            _ => BucketDelta::ZERO,
        },
        EntryStatus::Completed => match kind {
            EntryKind::Deposit | EntryKind::RoiPayout | EntryKind::ReferralCommission => {
                BucketDelta {
                    available: a,
                    locked: 0,
                    pending: 0,
                }
            }
            EntryKind::Withdrawal => {
                if bucket == BalanceBucket::Pending && a > 0 {
                    // Reversal of a rejected request: release the hold.
                    BucketDelta {
                        available: a,
                        locked: 0,
                        pending: -a,
                    }
                } else {
                    // Direct withdrawal, or a confirmed request whose hold
                    // has been released.
                    BucketDelta {
                        available: a,
                        locked: 0,
                        pending: 0,
                    }
                }
            }
            EntryKind::Stake | EntryKind::Unstake => BucketDelta {
                available: a,
                locked: -a,
                pending: 0,
            },
            EntryKind::AdminAdjustment => BucketDelta::single(bucket, a),
        },
    }
}

impl LedgerEntry {
    /// The entry's current contribution to its account's balance buckets
    pub fn effect(&self) -> BucketDelta {
        balance_effect(self.kind, self.bucket, self.amount, self.status)
    }

    /// Magnitude of the entry amount
    pub fn magnitude(&self) -> u128 {
        self.amount.unsigned_abs()
    }
}

impl NewEntry {
    /// Effect the entry will have once appended
    pub fn effect(&self) -> BucketDelta {
        balance_effect(self.kind, self.bucket, self.amount, self.status)
    }
}

/// Read-side filter for `transactions(account_id, filter)`
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,
    pub status: Option<EntryStatus>,
    pub since: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.created_at < since {
                return false;
            }
        }
        true
    }
}
