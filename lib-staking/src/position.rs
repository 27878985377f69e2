//! Stake position data model.

use crate::tier::Tier;
use chrono::{DateTime, NaiveDate, Utc};
use lib_types::{AccountId, Amount, PositionId};
use serde::{Deserialize, Serialize};

/// Stored position lifecycle state.
///
/// `Active -> Matured` happens at `unlocks_at` (persisted lazily by
/// `mature_positions`; readers should prefer
/// [`StakePosition::effective_status`]). `-> Withdrawn` happens on unstake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Active,
    Matured,
    Withdrawn,
}

/// One stake of principal against a tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub id: PositionId,
    pub account_id: AccountId,
    pub tier: Tier,
    /// Locked capital, minor units
    pub principal: Amount,
    /// Lifetime ROI paid out for this position
    pub accrued_total: Amount,
    /// Most recent trading day an ROI payout was credited
    pub last_accrued_day: Option<NaiveDate>,
    pub opened_at: DateTime<Utc>,
    /// `opened_at + tier.lock_days`
    pub unlocks_at: DateTime<Utc>,
    pub status: PositionStatus,
}

/// A position as proposed to the store, before an id is assigned
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub account_id: AccountId,
    pub tier: Tier,
    pub principal: Amount,
    pub opened_at: DateTime<Utc>,
    pub unlocks_at: DateTime<Utc>,
}

impl StakePosition {
    /// Whether the principal is still under the capital lock
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now < self.unlocks_at
    }

    /// Status as of `now`, independent of whether the lazy Active->Matured
    /// flip has been persisted yet
    pub fn effective_status(&self, now: DateTime<Utc>) -> PositionStatus {
        match self.status {
            PositionStatus::Withdrawn => PositionStatus::Withdrawn,
            _ if now >= self.unlocks_at => PositionStatus::Matured,
            s => s,
        }
    }

    /// Whether the position still accrues daily ROI: active and not yet at
    /// the end of its lock period
    pub fn is_accruing(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == PositionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn position() -> StakePosition {
        let opened = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        StakePosition {
            id: PositionId::new(1),
            account_id: AccountId::new(1),
            tier: Tier::Anchor,
            principal: 10_000,
            accrued_total: 0,
            last_accrued_day: None,
            opened_at: opened,
            unlocks_at: opened + Duration::days(30),
            status: PositionStatus::Active,
        }
    }

    #[test]
    fn effective_status_tracks_the_lock() {
        let p = position();
        assert_eq!(p.effective_status(p.opened_at), PositionStatus::Active);
        assert!(p.is_locked(p.opened_at + Duration::days(29)));

        let after_lock = p.opened_at + Duration::days(30);
        assert!(!p.is_locked(after_lock));
        assert_eq!(p.effective_status(after_lock), PositionStatus::Matured);
        assert!(!p.is_accruing(after_lock));
    }

    #[test]
    fn withdrawn_is_terminal() {
        let mut p = position();
        p.status = PositionStatus::Withdrawn;
        assert_eq!(p.effective_status(p.opened_at), PositionStatus::Withdrawn);
        assert_eq!(
            p.effective_status(p.unlocks_at + Duration::days(1)),
            PositionStatus::Withdrawn
        );
    }
}
