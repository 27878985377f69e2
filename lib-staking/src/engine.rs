//! The staking engine: open, close, and accrue stake positions.
//!
//! Fund movement is delegated to the wallet ledger (one entry per
//! operation); this module owns position lifecycle and the per-day accrual
//! idempotency. Accrual for one position is serialized behind a per-position
//! lock so overlapping scheduler runs cannot double-credit a day.

use crate::calendar::is_trading_day;
use crate::errors::{StakeError, StakeResult};
use crate::position::{NewPosition, PositionStatus, StakePosition};
use crate::roi::{daily_payout, daily_rate_bps};
use crate::store::PositionStore;
use crate::tier::Tier;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lib_ledger::{
    BalanceBucket, EntryKind, EntryRequest, LedgerEntry, LedgerError, WalletLedger,
};
use lib_types::{AccountId, Amount, ExternalRef, PositionId, SignedAmount};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one accrual attempt
#[derive(Debug, Clone)]
pub enum Accrual {
    /// A payout entry was credited for this trading day
    Credited(LedgerEntry),
    /// The day was already paid; the prior entry is returned, nothing new is
    /// credited. This is the idempotency contract that makes scheduler
    /// retries safe.
    AlreadyAccrued(LedgerEntry),
    /// No payout is due; not an error
    Skipped(SkipReason),
}

/// Why an accrual attempt paid nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The day is outside the tier's trading calendar
    OffCalendar,
    /// The position's lock period has ended; it no longer accrues
    Matured,
}

/// Stake lifecycle over the wallet ledger and a position store
pub struct StakingEngine {
    ledger: Arc<WalletLedger>,
    positions: Arc<dyn PositionStore>,
    /// Serializes accrual (and close) per position
    position_locks: Mutex<HashMap<PositionId, Arc<Mutex<()>>>>,
}

impl StakingEngine {
    pub fn new(ledger: Arc<WalletLedger>, positions: Arc<dyn PositionStore>) -> Self {
        Self {
            ledger,
            positions,
            position_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Stake `principal` from the account's available balance into a new
    /// position.
    ///
    /// Fails with `BelowMinimum` before touching the ledger; fails with
    /// `InsufficientFunds` (and persists nothing) if available is short. On
    /// success exactly one stake entry moves the funds available -> locked.
    pub fn open_stake(
        &self,
        account_id: AccountId,
        tier: Tier,
        principal: Amount,
        now: DateTime<Utc>,
    ) -> StakeResult<StakePosition> {
        let params = tier.params();
        if principal < params.min_capital {
            return Err(StakeError::BelowMinimum {
                minimum: params.min_capital,
                principal,
            });
        }

        let amount = to_signed(principal)?;
        self.ledger.apply(
            EntryRequest {
                account_id,
                kind: EntryKind::Stake,
                amount: -amount,
                bucket: BalanceBucket::Locked,
                related_entry_id: None,
                external_ref: None,
            },
            now,
        )?;

        let position = self.positions.create(NewPosition {
            account_id,
            tier,
            principal,
            opened_at: now,
            unlocks_at: now + Duration::days(params.lock_days),
        })?;
        info!(
            position = %position.id,
            account = %account_id,
            tier = %tier,
            principal = %principal,
            unlocks_at = %position.unlocks_at,
            "stake opened"
        );
        Ok(position)
    }

    /// Return the principal of a matured position to `available`.
    ///
    /// Fails with `StillLocked` before `unlocks_at`. ROI already paid out is
    /// unaffected — it lives in `available` from the moment it accrues.
    pub fn close_stake(
        &self,
        position_id: PositionId,
        now: DateTime<Utc>,
    ) -> StakeResult<LedgerEntry> {
        let lock = self.position_lock(position_id);
        let _guard = lock.lock();

        let mut position = self.position(position_id)?;
        if position.status == PositionStatus::Withdrawn {
            return Err(StakeError::NotActive(position_id));
        }
        if position.is_locked(now) {
            return Err(StakeError::StillLocked {
                unlocks_at: position.unlocks_at,
            });
        }

        let amount = to_signed(position.principal)?;
        let entry = self.ledger.apply(
            EntryRequest {
                account_id: position.account_id,
                kind: EntryKind::Unstake,
                amount,
                bucket: BalanceBucket::Available,
                related_entry_id: None,
                external_ref: None,
            },
            now,
        )?;

        position.status = PositionStatus::Withdrawn;
        self.positions.update(&position)?;
        info!(
            position = %position_id,
            account = %position.account_id,
            principal = %position.principal,
            "stake closed"
        );
        Ok(entry)
    }

    /// Credit one trading day's ROI for a position, at most once per day.
    ///
    /// The rate is the deterministic draw for `(position, trading_day)`
    /// bounded by the tier's range; the payout credits `available` (it
    /// becomes withdrawal-eligible after the standard payout maturity). A
    /// repeated call for an already-paid day returns the prior entry.
    pub fn accrue(
        &self,
        position_id: PositionId,
        trading_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> StakeResult<Accrual> {
        let lock = self.position_lock(position_id);
        let _guard = lock.lock();

        let mut position = self.position(position_id)?;
        if position.status == PositionStatus::Withdrawn {
            return Err(StakeError::NotActive(position_id));
        }
        if !position.is_accruing(now) {
            return Ok(Accrual::Skipped(SkipReason::Matured));
        }
        if !is_trading_day(position.tier, trading_day) {
            return Ok(Accrual::Skipped(SkipReason::OffCalendar));
        }

        // Idempotency: a recorded (position, day) means the payout happened.
        if let Some(entry_id) = self.positions.accrual(position_id, trading_day)? {
            let entry = self.ledger.entry(entry_id)?;
            debug!(position = %position_id, day = %trading_day, "already accrued");
            return Ok(Accrual::AlreadyAccrued(entry));
        }

        let params = position.tier.params();
        let rate = daily_rate_bps(
            position_id,
            trading_day,
            params.daily_roi_min,
            params.daily_roi_max,
        );
        let payout =
            daily_payout(position.principal, rate).ok_or(StakeError::Ledger(LedgerError::Overflow))?;

        let entry = self.ledger.apply(
            EntryRequest {
                account_id: position.account_id,
                kind: EntryKind::RoiPayout,
                amount: to_signed(payout)?,
                bucket: BalanceBucket::Available,
                related_entry_id: None,
                external_ref: Some(ExternalRef::new(format!("roi:{position_id}:{trading_day}"))),
            },
            now,
        )?;

        self.positions.record_accrual(position_id, trading_day, entry.id)?;
        position.accrued_total = position.accrued_total.saturating_add(payout);
        position.last_accrued_day = Some(trading_day);
        self.positions.update(&position)?;
        info!(
            position = %position_id,
            day = %trading_day,
            rate_bps = rate,
            payout = %payout,
            "roi accrued"
        );
        Ok(Accrual::Credited(entry))
    }

    /// Persist the `Active -> Matured` flip for every position past its
    /// lock. Returns how many were flipped.
    pub fn mature_positions(&self, now: DateTime<Utc>) -> StakeResult<usize> {
        let mut flipped = 0;
        for mut position in self.positions.active_positions()? {
            if !position.is_locked(now) {
                position.status = PositionStatus::Matured;
                self.positions.update(&position)?;
                flipped += 1;
            }
        }
        if flipped > 0 {
            info!(count = flipped, "positions matured");
        }
        Ok(flipped)
    }

    /// Positions that still accrue (stored status `Active`)
    pub fn active_positions(&self) -> StakeResult<Vec<StakePosition>> {
        self.positions.active_positions()
    }

    /// All positions for one account, any status
    pub fn stake_positions(&self, account_id: AccountId) -> StakeResult<Vec<StakePosition>> {
        self.positions.positions_for_account(account_id)
    }

    pub fn position(&self, position_id: PositionId) -> StakeResult<StakePosition> {
        self.positions
            .get(position_id)?
            .ok_or(StakeError::PositionNotFound(position_id))
    }

    fn position_lock(&self, position_id: PositionId) -> Arc<Mutex<()>> {
        let mut locks = self.position_locks.lock();
        locks.entry(position_id).or_default().clone()
    }
}

fn to_signed(amount: Amount) -> StakeResult<SignedAmount> {
    SignedAmount::try_from(amount).map_err(|_| StakeError::Ledger(LedgerError::Overflow))
}
