//! Position storage seam.
//!
//! Persists stake positions plus the accrual record — the
//! `(position, trading_day) -> entry` table that backs the per-day
//! idempotency key.
//!
//! Durable implementations must persist a payout's ledger entry and its
//! accrual record in one transaction; the engine treats a present record as
//! proof the payout happened.

use crate::errors::{StakeError, StakeResult};
use crate::position::{NewPosition, PositionStatus, StakePosition};
use chrono::NaiveDate;
use lib_types::{AccountId, EntryId, PositionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage operations required by the staking engine
pub trait PositionStore: Send + Sync {
    /// Persist a new position, assigning the next id
    fn create(&self, position: NewPosition) -> StakeResult<StakePosition>;

    fn get(&self, id: PositionId) -> StakeResult<Option<StakePosition>>;

    /// Overwrite an existing position
    fn update(&self, position: &StakePosition) -> StakeResult<()>;

    /// Positions with stored status `Active`, in id order
    fn active_positions(&self) -> StakeResult<Vec<StakePosition>>;

    fn positions_for_account(&self, account_id: AccountId) -> StakeResult<Vec<StakePosition>>;

    /// The payout entry already credited for `(position, day)`, if any
    fn accrual(&self, position_id: PositionId, day: NaiveDate) -> StakeResult<Option<EntryId>>;

    /// Record a credited payout for `(position, day)`
    fn record_accrual(
        &self,
        position_id: PositionId,
        day: NaiveDate,
        entry_id: EntryId,
    ) -> StakeResult<()>;
}

/// In-memory position store
#[derive(Debug, Default)]
pub struct MemoryPositionStore {
    positions: RwLock<HashMap<PositionId, StakePosition>>,
    accruals: RwLock<HashMap<(PositionId, NaiveDate), EntryId>>,
    next_id: AtomicU64,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
            accruals: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl PositionStore for MemoryPositionStore {
    fn create(&self, position: NewPosition) -> StakeResult<StakePosition> {
        let id = PositionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let position = StakePosition {
            id,
            account_id: position.account_id,
            tier: position.tier,
            principal: position.principal,
            accrued_total: 0,
            last_accrued_day: None,
            opened_at: position.opened_at,
            unlocks_at: position.unlocks_at,
            status: PositionStatus::Active,
        };
        self.positions.write().insert(id, position.clone());
        Ok(position)
    }

    fn get(&self, id: PositionId) -> StakeResult<Option<StakePosition>> {
        Ok(self.positions.read().get(&id).cloned())
    }

    fn update(&self, position: &StakePosition) -> StakeResult<()> {
        let mut positions = self.positions.write();
        if !positions.contains_key(&position.id) {
            return Err(StakeError::PositionNotFound(position.id));
        }
        positions.insert(position.id, position.clone());
        Ok(())
    }

    fn active_positions(&self) -> StakeResult<Vec<StakePosition>> {
        let mut active: Vec<StakePosition> = self
            .positions
            .read()
            .values()
            .filter(|p| p.status == PositionStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.id);
        Ok(active)
    }

    fn positions_for_account(&self, account_id: AccountId) -> StakeResult<Vec<StakePosition>> {
        let mut positions: Vec<StakePosition> = self
            .positions
            .read()
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        positions.sort_by_key(|p| p.id);
        Ok(positions)
    }

    fn accrual(&self, position_id: PositionId, day: NaiveDate) -> StakeResult<Option<EntryId>> {
        Ok(self.accruals.read().get(&(position_id, day)).copied())
    }

    fn record_accrual(
        &self,
        position_id: PositionId,
        day: NaiveDate,
        entry_id: EntryId,
    ) -> StakeResult<()> {
        self.accruals.write().insert((position_id, day), entry_id);
        Ok(())
    }
}
