//! Referral commission distribution.
//!
//! A qualifying completed deposit pays each of the depositor's upline
//! ancestors a decaying share: 10% at level 1 down to 1% at level 5. Each
//! level is credited as its own `ReferralCommission` ledger entry linked to
//! the originating deposit, and one level's failure never blocks another's.

use crate::errors::{ReferralError, ReferralResult};
use crate::graph::ReferralGraph;
use chrono::{DateTime, Utc};
use lib_ledger::{
    BalanceBucket, EntryFilter, EntryKind, EntryRequest, EntryStatus, LedgerEntry, LedgerError,
    WalletLedger,
};
use lib_types::{apply_bps, AccountId, Bps, EntryId, SignedAmount};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Commission rate per upline level, in basis points of the deposit.
/// Index 0 is the direct referrer.
pub const COMMISSION_LEVELS: [Bps; 5] = [1000, 500, 300, 200, 100];

/// How far up the referral chain commissions reach
pub const MAX_COMMISSION_DEPTH: usize = COMMISSION_LEVELS.len();

// A full five-level payout hands out 21% of the deposit, bounding the
// platform's commission liability.
const _: () = assert!(
    COMMISSION_LEVELS[0]
        + COMMISSION_LEVELS[1]
        + COMMISSION_LEVELS[2]
        + COMMISSION_LEVELS[3]
        + COMMISSION_LEVELS[4]
        == 2100
);

/// Rate for a 1-indexed upline level, `None` beyond the table
pub fn commission_rate(level: usize) -> Option<Bps> {
    if level == 0 {
        return None;
    }
    COMMISSION_LEVELS.get(level - 1).copied()
}

/// Which deposits trigger commission payouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommissionPolicy {
    /// Only a user's first completed deposit pays their upline
    #[default]
    FirstDepositOnly,
    /// Every completed deposit pays the upline
    EveryDeposit,
}

/// One upline level that could not be credited
#[derive(Debug)]
pub struct CommissionFailure {
    /// 1-indexed upline level
    pub level: u8,
    pub referrer: AccountId,
    pub error: LedgerError,
}

/// Outcome of distributing commissions for one deposit
#[derive(Debug, Default)]
pub struct CommissionReport {
    pub deposit_id: EntryId,
    pub depositor: AccountId,
    /// Whether the deposit qualified under the engine's policy. An
    /// unqualified deposit yields an empty report, not an error.
    pub qualified: bool,
    /// Commission entries written, nearest level first
    pub credited: Vec<LedgerEntry>,
    pub failures: Vec<CommissionFailure>,
}

/// Walks the upline of completed deposits and credits each level
pub struct CommissionEngine {
    ledger: Arc<WalletLedger>,
    graph: Arc<ReferralGraph>,
    policy: CommissionPolicy,
}

impl CommissionEngine {
    pub fn new(ledger: Arc<WalletLedger>, graph: Arc<ReferralGraph>) -> Self {
        Self::with_policy(ledger, graph, CommissionPolicy::default())
    }

    pub fn with_policy(
        ledger: Arc<WalletLedger>,
        graph: Arc<ReferralGraph>,
        policy: CommissionPolicy,
    ) -> Self {
        Self {
            ledger,
            graph,
            policy,
        }
    }

    pub fn policy(&self) -> CommissionPolicy {
        self.policy
    }

    /// Distribute commissions for one completed deposit.
    ///
    /// Runs after the deposit has settled; never called for pending or
    /// failed entries. Each level is an independent ledger write: a level
    /// that cannot be credited (say its account is missing) is recorded in
    /// the report and the walk continues. The caller decides whether to
    /// replay failed levels; rerunning the whole distribution would
    /// double-pay the levels that succeeded.
    pub fn distribute(
        &self,
        deposit: &LedgerEntry,
        now: DateTime<Utc>,
    ) -> ReferralResult<CommissionReport> {
        if deposit.kind != EntryKind::Deposit || deposit.status != EntryStatus::Completed {
            return Err(ReferralError::NotCommissionable(format!(
                "{} entry {} with status {:?}",
                deposit.kind, deposit.id, deposit.status
            )));
        }

        let mut report = CommissionReport {
            deposit_id: deposit.id,
            depositor: deposit.account_id,
            qualified: self.qualifies(deposit)?,
            ..CommissionReport::default()
        };
        if !report.qualified {
            debug!(
                deposit = %deposit.id,
                depositor = %deposit.account_id,
                "deposit does not qualify for commissions"
            );
            return Ok(report);
        }

        let deposit_amount = deposit.amount.unsigned_abs();
        let upline = self.graph.ancestors(deposit.account_id, MAX_COMMISSION_DEPTH)?;
        for (i, referrer) in upline.into_iter().enumerate() {
            let level = (i + 1) as u8;
            // The graph forbids cycles, but a durable store can be written
            // around `set_referrer`. A depositor never pays themselves.
            if referrer == deposit.account_id {
                warn!(
                    level,
                    depositor = %deposit.account_id,
                    deposit = %deposit.id,
                    "depositor appears in their own upline, skipping level"
                );
                continue;
            }
            let rate = COMMISSION_LEVELS[i];
            let Some(payout) = apply_bps(deposit_amount, rate) else {
                report.failures.push(CommissionFailure {
                    level,
                    referrer,
                    error: LedgerError::Overflow,
                });
                continue;
            };
            if payout == 0 {
                debug!(level, referrer = %referrer, "commission rounds to zero, skipping");
                continue;
            }
            // Bounded by deposit_amount, which fit in SignedAmount when the
            // deposit entry was written.
            let amount = payout as SignedAmount;
            let request = EntryRequest {
                account_id: referrer,
                kind: EntryKind::ReferralCommission,
                amount,
                bucket: BalanceBucket::Available,
                related_entry_id: Some(deposit.id),
                external_ref: None,
            };
            match self.ledger.apply(request, now) {
                Ok(entry) => report.credited.push(entry),
                Err(e) => {
                    warn!(
                        level,
                        referrer = %referrer,
                        deposit = %deposit.id,
                        error = %e,
                        "commission level failed, continuing with the rest"
                    );
                    report.failures.push(CommissionFailure {
                        level,
                        referrer,
                        error: e,
                    });
                }
            }
        }

        info!(
            deposit = %deposit.id,
            depositor = %deposit.account_id,
            credited = report.credited.len(),
            failed = report.failures.len(),
            "commission distribution complete"
        );
        Ok(report)
    }

    /// Policy gate: under `FirstDepositOnly`, only the depositor's earliest
    /// completed deposit pays the upline.
    fn qualifies(&self, deposit: &LedgerEntry) -> ReferralResult<bool> {
        match self.policy {
            CommissionPolicy::EveryDeposit => Ok(true),
            CommissionPolicy::FirstDepositOnly => {
                let filter = EntryFilter {
                    kind: Some(EntryKind::Deposit),
                    status: Some(EntryStatus::Completed),
                    since: None,
                };
                let deposits = self
                    .ledger
                    .transactions(deposit.account_id, &filter)
                    .map_err(|e| ReferralError::Storage(e.to_string()))?;
                Ok(!deposits.iter().any(|e| e.id < deposit.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryReferralStore;
    use chrono::TimeZone;
    use lib_ledger::MemoryLedgerStore;
    use lib_types::{Amount, ExternalRef};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn acct(id: u64) -> AccountId {
        AccountId::new(id)
    }

    struct Harness {
        ledger: Arc<WalletLedger>,
        graph: Arc<ReferralGraph>,
    }

    impl Harness {
        fn new() -> Self {
            let ledger =
                Arc::new(WalletLedger::new(Arc::new(MemoryLedgerStore::new())).unwrap());
            let graph = Arc::new(ReferralGraph::new(Arc::new(MemoryReferralStore::new())));
            Self { ledger, graph }
        }

        fn engine(&self, policy: CommissionPolicy) -> CommissionEngine {
            CommissionEngine::with_policy(self.ledger.clone(), self.graph.clone(), policy)
        }

        /// Register `user` with an optional referrer and a funded account
        fn register(&self, user: AccountId, referrer: Option<AccountId>) {
            self.ledger.open_account(user).unwrap();
            if let Some(referrer) = referrer {
                self.graph.set_referrer(user, referrer, t0()).unwrap();
            }
        }

        fn deposit(&self, user: AccountId, amount: Amount) -> LedgerEntry {
            self.ledger
                .confirm_deposit(user, amount, ExternalRef::new("tx-test"), t0())
                .unwrap()
        }

        fn available(&self, user: AccountId) -> Amount {
            self.ledger.balance(user).unwrap().available
        }
    }

    #[test]
    fn rate_table_decays_over_five_levels() {
        assert_eq!(commission_rate(1), Some(1000));
        assert_eq!(commission_rate(5), Some(100));
        assert_eq!(commission_rate(0), None);
        assert_eq!(commission_rate(6), None);
    }

    #[test]
    fn five_level_chain_gets_the_full_decay() {
        let h = Harness::new();
        // 1 <- 2 <- 3 <- 4 <- 5 <- 6; account 6 deposits.
        h.register(acct(1), None);
        for id in 2..=6 {
            h.register(acct(id), Some(acct(id - 1)));
        }

        let deposit = h.deposit(acct(6), 1_000);
        let report = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&deposit, t0())
            .unwrap();

        assert!(report.qualified);
        assert!(report.failures.is_empty());
        assert_eq!(report.credited.len(), 5);

        // 10 / 5 / 3 / 2 / 1 percent, nearest ancestor first.
        assert_eq!(h.available(acct(5)), 100);
        assert_eq!(h.available(acct(4)), 50);
        assert_eq!(h.available(acct(3)), 30);
        assert_eq!(h.available(acct(2)), 20);
        assert_eq!(h.available(acct(1)), 10);

        for entry in &report.credited {
            assert_eq!(entry.kind, EntryKind::ReferralCommission);
            assert_eq!(entry.related_entry_id, Some(deposit.id));
        }
    }

    #[test]
    fn short_chain_pays_only_existing_levels() {
        let h = Harness::new();
        h.register(acct(1), None);
        h.register(acct(2), Some(acct(1)));
        h.register(acct(3), Some(acct(2)));

        let deposit = h.deposit(acct(3), 10_000);
        let report = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&deposit, t0())
            .unwrap();

        assert_eq!(report.credited.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(h.available(acct(2)), 1_000);
        assert_eq!(h.available(acct(1)), 500);
    }

    #[test]
    fn no_referrer_means_no_commissions() {
        let h = Harness::new();
        h.register(acct(1), None);

        let deposit = h.deposit(acct(1), 5_000);
        let report = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&deposit, t0())
            .unwrap();

        assert!(report.qualified);
        assert!(report.credited.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn one_broken_level_does_not_block_the_rest() {
        let h = Harness::new();
        // Account 2's ledger account is never opened; its commission leg
        // fails while levels 1 and 3 are still credited.
        h.register(acct(1), None);
        h.ledger.open_account(acct(3)).unwrap();
        h.graph.set_referrer(acct(2), acct(1), t0()).unwrap();
        h.graph.set_referrer(acct(3), acct(2), t0()).unwrap();
        h.register(acct(4), Some(acct(3)));

        let deposit = h.deposit(acct(4), 1_000);
        let report = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&deposit, t0())
            .unwrap();

        assert_eq!(report.credited.len(), 2);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.level, 2);
        assert_eq!(failure.referrer, acct(2));
        assert!(matches!(failure.error, LedgerError::AccountNotFound(_)));

        assert_eq!(h.available(acct(3)), 100);
        assert_eq!(h.available(acct(1)), 30);
    }

    #[test]
    fn first_deposit_only_ignores_later_deposits() {
        let h = Harness::new();
        h.register(acct(1), None);
        h.register(acct(2), Some(acct(1)));
        let engine = h.engine(CommissionPolicy::FirstDepositOnly);

        let first = h.deposit(acct(2), 1_000);
        let report = engine.distribute(&first, t0()).unwrap();
        assert!(report.qualified);
        assert_eq!(h.available(acct(1)), 100);

        let second = h.deposit(acct(2), 50_000);
        let report = engine.distribute(&second, t0()).unwrap();
        assert!(!report.qualified);
        assert!(report.credited.is_empty());
        assert_eq!(h.available(acct(1)), 100);
    }

    #[test]
    fn every_deposit_policy_pays_each_time() {
        let h = Harness::new();
        h.register(acct(1), None);
        h.register(acct(2), Some(acct(1)));
        let engine = h.engine(CommissionPolicy::EveryDeposit);

        let first = h.deposit(acct(2), 1_000);
        engine.distribute(&first, t0()).unwrap();
        let second = h.deposit(acct(2), 2_000);
        engine.distribute(&second, t0()).unwrap();

        assert_eq!(h.available(acct(1)), 100 + 200);
    }

    #[test]
    fn tiny_deposit_levels_round_down_to_nothing() {
        let h = Harness::new();
        h.register(acct(1), None);
        h.register(acct(2), Some(acct(1)));

        // 1% of 50 rounds to 0 at level 5; here even level 1 (10%) pays 0
        // for a 9-unit deposit.
        let deposit = h.deposit(acct(2), 9);
        let report = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&deposit, t0())
            .unwrap();

        assert!(report.qualified);
        assert!(report.credited.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(h.available(acct(1)), 0);
    }

    #[test]
    fn depositor_in_a_corrupt_cyclic_upline_is_never_paid() {
        use crate::graph::{MemoryReferralStore, ReferralEdge, ReferralStore};

        // Plant 1 <-> 2 directly in the store, bypassing set_referrer's
        // cycle check the way a hand-edited durable backend could.
        let store = Arc::new(MemoryReferralStore::new());
        store
            .insert(ReferralEdge {
                user_id: acct(1),
                referrer_id: acct(2),
                created_at: t0(),
            })
            .unwrap();
        store
            .insert(ReferralEdge {
                user_id: acct(2),
                referrer_id: acct(1),
                created_at: t0(),
            })
            .unwrap();

        let ledger = Arc::new(WalletLedger::new(Arc::new(MemoryLedgerStore::new())).unwrap());
        ledger.open_account(acct(1)).unwrap();
        ledger.open_account(acct(2)).unwrap();
        let graph = Arc::new(ReferralGraph::new(store));
        let engine = CommissionEngine::new(ledger.clone(), graph);

        let deposit = ledger
            .confirm_deposit(acct(1), 1_000, ExternalRef::new("tx-cyclic"), t0())
            .unwrap();
        let report = engine.distribute(&deposit, t0()).unwrap();

        // The depositor's own appearances at levels 2 and 4 are skipped;
        // every credit lands on the other node of the cycle.
        assert!(report.failures.is_empty());
        assert!(report.credited.iter().all(|e| e.account_id == acct(2)));

        let commission_filter = EntryFilter {
            kind: Some(EntryKind::ReferralCommission),
            status: None,
            since: None,
        };
        assert!(ledger
            .transactions(acct(1), &commission_filter)
            .unwrap()
            .is_empty());
        assert_eq!(ledger.balance(acct(1)).unwrap().available, 1_000);
        // Levels 1, 3, 5 of the 1,000-unit deposit: 100 + 30 + 10.
        assert_eq!(ledger.balance(acct(2)).unwrap().available, 140);
    }

    #[test]
    fn non_deposit_entries_are_rejected() {
        let h = Harness::new();
        h.register(acct(1), None);
        h.register(acct(2), Some(acct(1)));

        let deposit = h.deposit(acct(2), 1_000);
        let mut fake = deposit.clone();
        fake.kind = EntryKind::Withdrawal;

        let err = h
            .engine(CommissionPolicy::FirstDepositOnly)
            .distribute(&fake, t0())
            .unwrap_err();
        assert!(matches!(err, ReferralError::NotCommissionable(_)));
    }
}
