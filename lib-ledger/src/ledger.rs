//! The wallet ledger: the single mutation surface for account balances.
//!
//! # Serialization discipline
//!
//! Every mutation of one account's balances happens under that account's
//! exclusive lock, held across validate-then-persist. On a validation failure
//! nothing is persisted. Operations on different accounts proceed in
//! parallel; cross-account flows (commission fan-out, accrual sweeps) are
//! decomposed by the callers into independent single-account entries linked
//! by `related_entry_id` — the ledger itself never spans accounts.
//!
//! # Payout maturity
//!
//! ROI payouts credit `available` immediately but are withdrawal-eligible
//! only after [`payout_maturity`] (24h). Withdrawal validation therefore
//! checks against [`WalletLedger::withdrawable`], not raw `available`.

use crate::account::Account;
use crate::entry::{
    BalanceBucket, EntryFilter, EntryKind, EntryStatus, LedgerEntry, NewEntry,
};
use crate::errors::{LedgerError, LedgerResult};
use crate::store::LedgerStore;
use chrono::{DateTime, Duration, Utc};
use lib_types::{AccountId, Amount, EntryId, ExternalRef, SignedAmount};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Delay before an ROI payout becomes withdrawal-eligible, in hours
pub const PAYOUT_MATURITY_HOURS: i64 = 24;

/// Delay before an ROI payout becomes withdrawal-eligible
pub fn payout_maturity() -> Duration {
    Duration::hours(PAYOUT_MATURITY_HOURS)
}

/// A proposed ledger entry, as submitted by an engine or entry point
#[derive(Debug, Clone)]
pub struct EntryRequest {
    pub account_id: AccountId,
    pub kind: EntryKind,
    /// Signed minor units; the sign must match the kind (credits positive,
    /// withdrawals and stakes negative)
    pub amount: SignedAmount,
    pub bucket: BalanceBucket,
    pub related_entry_id: Option<EntryId>,
    pub external_ref: Option<ExternalRef>,
}

/// Per-user balance state over an append-only entry log
pub struct WalletLedger {
    store: Arc<dyn LedgerStore>,
    /// Balance cache; always equal to the folded entry log
    snapshots: RwLock<HashMap<AccountId, Account>>,
    /// Lock table serializing per-account mutation
    account_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl WalletLedger {
    /// Construct over a store, rebuilding balance snapshots from the entry
    /// log (crash recovery: snapshots are derived state).
    pub fn new(store: Arc<dyn LedgerStore>) -> LedgerResult<Self> {
        let ledger = Self {
            store,
            snapshots: RwLock::new(HashMap::new()),
            account_locks: Mutex::new(HashMap::new()),
        };
        ledger.rebuild()?;
        Ok(ledger)
    }

    /// Register a new account with zero balances
    pub fn open_account(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.store.create_account(account_id)?;
        let account = Account::new(account_id);
        self.snapshots.write().insert(account_id, account.clone());
        info!(account = %account_id, "account opened");
        Ok(account)
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Validate and apply a proposed entry as `Completed`.
    ///
    /// On success the entry is persisted and the snapshot updated under the
    /// account lock; on violation nothing is persisted and the error names
    /// the constraint (`InsufficientFunds`, `InvalidEntry`).
    pub fn apply(&self, request: EntryRequest, now: DateTime<Utc>) -> LedgerResult<LedgerEntry> {
        self.apply_with_status(request, EntryStatus::Completed, now)
    }

    /// External confirmation entry point: a deposit settled by the payment
    /// processor / admin approval flow.
    pub fn confirm_deposit(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        let amount = to_signed(amount)?;
        self.apply(
            EntryRequest {
                account_id,
                kind: EntryKind::Deposit,
                amount,
                bucket: BalanceBucket::Available,
                related_entry_id: None,
                external_ref: Some(external_ref),
            },
            now,
        )
    }

    /// External confirmation entry point: an immediately-settled withdrawal.
    pub fn confirm_withdrawal(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        let amount = to_signed(amount)?;
        self.apply(
            EntryRequest {
                account_id,
                kind: EntryKind::Withdrawal,
                amount: -amount,
                bucket: BalanceBucket::Available,
                related_entry_id: None,
                external_ref: Some(external_ref),
            },
            now,
        )
    }

    /// Start a withdrawal that awaits external settlement: moves the funds
    /// from `available` into a `pending` hold. Settle with
    /// [`confirm_withdrawal_request`](Self::confirm_withdrawal_request) or
    /// cancel with
    /// [`reject_withdrawal_request`](Self::reject_withdrawal_request).
    pub fn request_withdrawal(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        let amount = to_signed(amount)?;
        self.apply_with_status(
            EntryRequest {
                account_id,
                kind: EntryKind::Withdrawal,
                amount: -amount,
                bucket: BalanceBucket::Pending,
                related_entry_id: None,
                external_ref: Some(external_ref),
            },
            EntryStatus::Pending,
            now,
        )
    }

    /// Settle a pending withdrawal request: the held funds leave the account.
    pub fn confirm_withdrawal_request(&self, entry_id: EntryId) -> LedgerResult<LedgerEntry> {
        let current = self.pending_request(entry_id)?;
        let lock = self.account_lock(current.account_id);
        let _guard = lock.lock();

        let before = current.effect();
        let updated = self
            .store
            .update_status(entry_id, EntryStatus::Pending, EntryStatus::Completed)?;
        let delta = updated.effect().minus(&before);
        self.commit_snapshot(updated.account_id, &delta)?;
        info!(entry = %entry_id, account = %updated.account_id, "withdrawal request settled");
        Ok(updated)
    }

    /// Cancel a pending withdrawal request. The hold is released by a new
    /// offsetting entry linked via `related_entry_id`; the original entry is
    /// marked `Reversed`, never edited in place.
    pub fn reject_withdrawal_request(
        &self,
        entry_id: EntryId,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        let current = self.pending_request(entry_id)?;
        let lock = self.account_lock(current.account_id);
        let _guard = lock.lock();

        let reversal = self.store.append(NewEntry {
            account_id: current.account_id,
            kind: EntryKind::Withdrawal,
            amount: -current.amount, // positive: releases the hold
            bucket: BalanceBucket::Pending,
            status: EntryStatus::Completed,
            created_at: now,
            related_entry_id: Some(entry_id),
            external_ref: current.external_ref.clone(),
        })?;
        // Reversed keeps the hold effect, so this transition is
        // balance-neutral; the reversal entry above carries the offset.
        self.store
            .update_status(entry_id, EntryStatus::Pending, EntryStatus::Reversed)?;
        self.commit_snapshot(current.account_id, &reversal.effect())?;
        info!(
            entry = %entry_id,
            reversal = %reversal.id,
            account = %current.account_id,
            "withdrawal request reversed"
        );
        Ok(reversal)
    }

    /// Manual operator adjustment against a single bucket. Signed amount;
    /// the same non-negativity validation applies.
    pub fn admin_adjust(
        &self,
        account_id: AccountId,
        amount: SignedAmount,
        bucket: BalanceBucket,
        note: ExternalRef,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        self.apply(
            EntryRequest {
                account_id,
                kind: EntryKind::AdminAdjustment,
                amount,
                bucket,
                related_entry_id: None,
                external_ref: Some(note),
            },
            now,
        )
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Every account known to the ledger, ascending
    pub fn account_ids(&self) -> LedgerResult<Vec<AccountId>> {
        self.store.account_ids()
    }

    /// Cached balance snapshot. Equal to [`replay`](Self::replay) at all
    /// times (the ledger replay invariant).
    pub fn balance(&self, account_id: AccountId) -> LedgerResult<Account> {
        self.snapshots
            .read()
            .get(&account_id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Withdrawal-eligible funds: `available` minus ROI payouts younger than
    /// [`payout_maturity`].
    pub fn withdrawable(&self, account_id: AccountId, now: DateTime<Utc>) -> LedgerResult<Amount> {
        let account = self.balance(account_id)?;
        let immature = self.immature_roi(account_id, now)?;
        Ok(account.available.saturating_sub(immature))
    }

    /// Filtered entry log for one account, in id order
    pub fn transactions(
        &self,
        account_id: AccountId,
        filter: &EntryFilter,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        if !self.store.has_account(account_id)? {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        Ok(self
            .store
            .entries_for_account(account_id)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    /// Reconstruct an account's balances from the entry log alone, ignoring
    /// the snapshot cache. `version` is the folded entry count.
    pub fn replay(&self, account_id: AccountId) -> LedgerResult<Account> {
        if !self.store.has_account(account_id)? {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        let mut account = Account::new(account_id);
        for entry in self.store.entries_for_account(account_id)? {
            account = account.checked_apply(&entry.effect()).map_err(|e| {
                LedgerError::InvalidEntry(format!(
                    "log replays to an invalid balance at {}: {e}",
                    entry.id
                ))
            })?;
        }
        debug!(account = %account_id, "replayed {} entries", account.version);
        Ok(account)
    }

    /// Rebuild every snapshot from the entry log. Intended for startup;
    /// holds the snapshot table exclusively for the duration.
    pub fn rebuild(&self) -> LedgerResult<()> {
        let mut snapshots = self.snapshots.write();
        snapshots.clear();
        for account_id in self.store.account_ids()? {
            let mut account = Account::new(account_id);
            for entry in self.store.entries_for_account(account_id)? {
                account = account.checked_apply(&entry.effect()).map_err(|e| {
                    LedgerError::InvalidEntry(format!(
                        "log replays to an invalid balance at {}: {e}",
                        entry.id
                    ))
                })?;
            }
            snapshots.insert(account_id, account);
        }
        Ok(())
    }

    /// Fetch a single entry
    pub fn entry(&self, entry_id: EntryId) -> LedgerResult<LedgerEntry> {
        self.store
            .entry(entry_id)?
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn apply_with_status(
        &self,
        request: EntryRequest,
        status: EntryStatus,
        now: DateTime<Utc>,
    ) -> LedgerResult<LedgerEntry> {
        validate_shape(&request)?;

        let lock = self.account_lock(request.account_id);
        let _guard = lock.lock();

        let snapshot = self.balance(request.account_id)?;

        let new_entry = NewEntry {
            account_id: request.account_id,
            kind: request.kind,
            amount: request.amount,
            bucket: request.bucket,
            status,
            created_at: now,
            related_entry_id: request.related_entry_id,
            external_ref: request.external_ref,
        };

        // Withdrawals are additionally capped by payout maturity: recent ROI
        // counts toward available but not toward withdrawable.
        if new_entry.kind == EntryKind::Withdrawal {
            let need = new_entry.amount.unsigned_abs();
            let eligible = snapshot
                .available
                .saturating_sub(self.immature_roi(request.account_id, now)?);
            if need > eligible {
                return Err(LedgerError::InsufficientFunds {
                    have: eligible,
                    need,
                });
            }
        }

        let updated = snapshot.checked_apply(&new_entry.effect())?;
        let entry = self.store.append(new_entry)?;
        self.snapshots.write().insert(request.account_id, updated);
        info!(
            entry = %entry.id,
            account = %entry.account_id,
            kind = %entry.kind,
            amount = %entry.amount,
            status = ?entry.status,
            "entry applied"
        );
        Ok(entry)
    }

    fn pending_request(&self, entry_id: EntryId) -> LedgerResult<LedgerEntry> {
        let entry = self.entry(entry_id)?;
        if entry.kind != EntryKind::Withdrawal
            || entry.bucket != BalanceBucket::Pending
            || entry.status != EntryStatus::Pending
        {
            return Err(LedgerError::InvalidEntry(format!(
                "{} is not a pending withdrawal request",
                entry_id
            )));
        }
        Ok(entry)
    }

    fn commit_snapshot(
        &self,
        account_id: AccountId,
        delta: &crate::entry::BucketDelta,
    ) -> LedgerResult<()> {
        let snapshot = self.balance(account_id)?;
        let updated = snapshot.checked_apply(delta)?;
        self.snapshots.write().insert(account_id, updated);
        Ok(())
    }

    fn immature_roi(&self, account_id: AccountId, now: DateTime<Utc>) -> LedgerResult<Amount> {
        let cutoff = now - payout_maturity();
        let mut total: Amount = 0;
        for entry in self.store.entries_for_account(account_id)? {
            if entry.kind == EntryKind::RoiPayout
                && entry.status == EntryStatus::Completed
                && entry.created_at > cutoff
            {
                total = total.saturating_add(entry.magnitude());
            }
        }
        Ok(total)
    }

    fn account_lock(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock();
        locks.entry(account_id).or_default().clone()
    }
}

/// Enforce the per-kind sign and bucket conventions before anything is
/// persisted. Zero amounts are always invalid.
fn validate_shape(request: &EntryRequest) -> LedgerResult<()> {
    use BalanceBucket::*;
    use EntryKind::*;

    if request.amount == 0 {
        return Err(LedgerError::InvalidEntry("zero amount".into()));
    }

    let ok = match request.kind {
        Deposit | RoiPayout | ReferralCommission => {
            request.amount > 0 && request.bucket == Available
        }
        Unstake => request.amount > 0 && request.bucket == Available,
        Withdrawal => request.amount < 0 && matches!(request.bucket, Available | Pending),
        Stake => request.amount < 0 && request.bucket == Locked,
        AdminAdjustment => true,
    };
    if !ok {
        return Err(LedgerError::InvalidEntry(format!(
            "{} of {} against {:?} violates the sign/bucket convention",
            request.kind, request.amount, request.bucket
        )));
    }
    Ok(())
}

fn to_signed(amount: Amount) -> LedgerResult<SignedAmount> {
    SignedAmount::try_from(amount).map_err(|_| LedgerError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use chrono::TimeZone;

    fn ledger() -> WalletLedger {
        WalletLedger::new(Arc::new(MemoryLedgerStore::new())).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn ext(s: &str) -> ExternalRef {
        ExternalRef::new(s)
    }

    const ALICE: AccountId = AccountId::new(1);

    #[test]
    fn deposit_credits_available() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        let entry = ledger
            .confirm_deposit(ALICE, 10_000, ext("dep-1"), t0())
            .unwrap();
        assert_eq!(entry.kind, EntryKind::Deposit);
        assert_eq!(entry.status, EntryStatus::Completed);
        assert_eq!(ledger.balance(ALICE).unwrap().buckets(), (10_000, 0, 0));
    }

    #[test]
    fn unknown_account_is_rejected() {
        let ledger = ledger();
        let err = ledger
            .confirm_deposit(ALICE, 10_000, ext("dep-1"), t0())
            .unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound(ALICE));
    }

    #[test]
    fn sign_convention_enforced() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        let err = ledger
            .apply(
                EntryRequest {
                    account_id: ALICE,
                    kind: EntryKind::Deposit,
                    amount: -5,
                    bucket: BalanceBucket::Available,
                    related_entry_id: None,
                    external_ref: None,
                },
                t0(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEntry(_)));

        let err = ledger
            .apply(
                EntryRequest {
                    account_id: ALICE,
                    kind: EntryKind::Stake,
                    amount: 0,
                    bucket: BalanceBucket::Locked,
                    related_entry_id: None,
                    external_ref: None,
                },
                t0(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEntry(_)));
    }

    #[test]
    fn failed_withdrawal_persists_nothing() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = WalletLedger::new(store.clone()).unwrap();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 100, ext("dep"), t0()).unwrap();

        let err = ledger
            .confirm_withdrawal(ALICE, 200, ext("wd"), t0())
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { have: 100, need: 200 });

        // One entry only: the deposit.
        assert_eq!(store.all_entries().unwrap().len(), 1);
        assert_eq!(ledger.balance(ALICE).unwrap().buckets(), (100, 0, 0));
    }

    #[test]
    fn snapshot_equals_replay_through_mixed_operations() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        let now = t0();
        ledger.confirm_deposit(ALICE, 50_000, ext("d1"), now).unwrap();
        ledger
            .apply(
                EntryRequest {
                    account_id: ALICE,
                    kind: EntryKind::Stake,
                    amount: -20_000,
                    bucket: BalanceBucket::Locked,
                    related_entry_id: None,
                    external_ref: None,
                },
                now,
            )
            .unwrap();
        let req = ledger
            .request_withdrawal(ALICE, 5_000, ext("wd-req"), now)
            .unwrap();
        ledger.confirm_withdrawal(ALICE, 1_000, ext("wd"), now).unwrap();
        ledger.reject_withdrawal_request(req.id, now).unwrap();

        let snapshot = ledger.balance(ALICE).unwrap();
        let replayed = ledger.replay(ALICE).unwrap();
        assert_eq!(snapshot.buckets(), replayed.buckets());
        assert_eq!(snapshot.buckets(), (29_000, 20_000, 0));
    }

    #[test]
    fn withdrawal_request_confirm_releases_hold() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 10_000, ext("d"), t0()).unwrap();

        let req = ledger
            .request_withdrawal(ALICE, 4_000, ext("wd"), t0())
            .unwrap();
        assert_eq!(ledger.balance(ALICE).unwrap().buckets(), (6_000, 0, 4_000));

        let settled = ledger.confirm_withdrawal_request(req.id).unwrap();
        assert_eq!(settled.status, EntryStatus::Completed);
        assert_eq!(ledger.balance(ALICE).unwrap().buckets(), (6_000, 0, 0));
    }

    #[test]
    fn withdrawal_request_reject_restores_available() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 10_000, ext("d"), t0()).unwrap();

        let req = ledger
            .request_withdrawal(ALICE, 4_000, ext("wd"), t0())
            .unwrap();
        let reversal = ledger.reject_withdrawal_request(req.id, t0()).unwrap();

        assert_eq!(reversal.related_entry_id, Some(req.id));
        assert_eq!(reversal.amount, 4_000);
        assert_eq!(ledger.entry(req.id).unwrap().status, EntryStatus::Reversed);
        assert_eq!(ledger.balance(ALICE).unwrap().buckets(), (10_000, 0, 0));

        // A rejected request cannot be settled afterwards.
        let err = ledger.confirm_withdrawal_request(req.id).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEntry(_)));
    }

    #[test]
    fn roi_payout_matures_before_withdrawal() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        let now = t0();
        ledger.confirm_deposit(ALICE, 1_000, ext("d"), now).unwrap();
        ledger
            .apply(
                EntryRequest {
                    account_id: ALICE,
                    kind: EntryKind::RoiPayout,
                    amount: 500,
                    bucket: BalanceBucket::Available,
                    related_entry_id: None,
                    external_ref: None,
                },
                now,
            )
            .unwrap();

        assert_eq!(ledger.balance(ALICE).unwrap().available, 1_500);
        assert_eq!(ledger.withdrawable(ALICE, now).unwrap(), 1_000);

        // Inside the maturity window only the deposit is withdrawable.
        let err = ledger
            .confirm_withdrawal(ALICE, 1_200, ext("wd"), now + Duration::hours(1))
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { have: 1_000, need: 1_200 });

        // After 24h the payout is eligible.
        let later = now + Duration::hours(25);
        assert_eq!(ledger.withdrawable(ALICE, later).unwrap(), 1_500);
        ledger.confirm_withdrawal(ALICE, 1_200, ext("wd"), later).unwrap();
        assert_eq!(ledger.balance(ALICE).unwrap().available, 300);
    }

    #[test]
    fn admin_adjust_respects_bucket_floor() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 1_000, ext("d"), t0()).unwrap();

        ledger
            .admin_adjust(ALICE, -400, BalanceBucket::Available, ext("correction"), t0())
            .unwrap();
        assert_eq!(ledger.balance(ALICE).unwrap().available, 600);

        let err = ledger
            .admin_adjust(ALICE, -700, BalanceBucket::Available, ext("too far"), t0())
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { have: 600, need: 700 });
    }

    #[test]
    fn rebuild_restores_snapshots_from_log() {
        let store = Arc::new(MemoryLedgerStore::new());
        let ledger = WalletLedger::new(store.clone()).unwrap();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 7_500, ext("d"), t0()).unwrap();
        ledger.request_withdrawal(ALICE, 2_500, ext("wd"), t0()).unwrap();
        let before = ledger.balance(ALICE).unwrap();

        // Fresh ledger over the same store: snapshots come back identically.
        let recovered = WalletLedger::new(store).unwrap();
        assert_eq!(recovered.balance(ALICE).unwrap().buckets(), before.buckets());
        assert_eq!(before.buckets(), (5_000, 0, 2_500));
    }

    #[test]
    fn concurrent_withdrawals_never_overdraw() {
        let ledger = Arc::new(ledger());
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 1_000, ext("d"), t0()).unwrap();

        // Two equal withdrawals against funds for exactly one of them.
        let handles: Vec<_> = (0..2)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger.confirm_withdrawal(
                        ALICE,
                        1_000,
                        ExternalRef::new(format!("wd-{i}")),
                        t0(),
                    )
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let shortfalls = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientFunds { .. })))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(shortfalls, 1);

        let account = ledger.balance(ALICE).unwrap();
        assert_eq!(account.available, 0);
        assert_eq!(account.buckets(), ledger.replay(ALICE).unwrap().buckets());
    }

    #[test]
    fn transactions_filter_by_kind() {
        let ledger = ledger();
        ledger.open_account(ALICE).unwrap();
        ledger.confirm_deposit(ALICE, 1_000, ext("d1"), t0()).unwrap();
        ledger.confirm_deposit(ALICE, 2_000, ext("d2"), t0()).unwrap();
        ledger.confirm_withdrawal(ALICE, 500, ext("w1"), t0()).unwrap();

        let deposits = ledger
            .transactions(
                ALICE,
                &EntryFilter {
                    kind: Some(EntryKind::Deposit),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(deposits.len(), 2);
        let all = ledger.transactions(ALICE, &EntryFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
    }
}
