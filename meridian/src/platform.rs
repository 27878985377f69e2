//! The platform facade: one object wiring the ledger, staking engine,
//! referral graph and accrual scheduler together.
//!
//! [`Platform`] owns the subsystem handles and exposes the operations an
//! API layer would call: registration, deposits (with commission fan-out),
//! withdrawals, stakes and the daily accrual run. Each operation delegates
//! to the owning subsystem; the facade adds only the cross-subsystem wiring
//! (a settled deposit triggers commission distribution, registration links
//! the referral edge to a freshly opened account).

use crate::errors::PlatformResult;
use chrono::{DateTime, NaiveDate, Utc};
use lib_ledger::{
    Account, EntryFilter, EntryKind, EntryStatus, LedgerEntry, LedgerStore, MemoryLedgerStore,
    WalletLedger,
};
use lib_referral::{
    CommissionEngine, CommissionPolicy, CommissionReport, MemoryReferralStore, ReferralGraph,
    ReferralStore, MAX_COMMISSION_DEPTH,
};
use lib_staking::{
    AccrualRun, AccrualScheduler, MemoryPositionStore, PositionStore, SchedulerConfig,
    StakePosition, StakingEngine, Tier,
};
use lib_types::{AccountId, Amount, EntryId, ExternalRef, PositionId, SignedAmount};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// A settled deposit and the commission fan-out it triggered
#[derive(Debug)]
pub struct DepositOutcome {
    pub entry: LedgerEntry,
    pub commissions: CommissionReport,
}

/// A user's referral network summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralStats {
    pub account_id: AccountId,
    /// Network size per upline-visible level, index 0 = direct referees
    pub network: Vec<usize>,
    /// Sum of all commission entries this account has received
    pub total_commission: Amount,
}

/// Backing stores and tuning for a [`Platform`]
pub struct PlatformConfig {
    pub ledger_store: Arc<dyn LedgerStore>,
    pub position_store: Arc<dyn PositionStore>,
    pub referral_store: Arc<dyn ReferralStore>,
    pub scheduler: SchedulerConfig,
    pub commission_policy: CommissionPolicy,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            ledger_store: Arc::new(MemoryLedgerStore::new()),
            position_store: Arc::new(MemoryPositionStore::new()),
            referral_store: Arc::new(MemoryReferralStore::new()),
            scheduler: SchedulerConfig::default(),
            commission_policy: CommissionPolicy::default(),
        }
    }
}

/// The assembled platform
pub struct Platform {
    ledger: Arc<WalletLedger>,
    graph: Arc<ReferralGraph>,
    commissions: CommissionEngine,
    staking: Arc<StakingEngine>,
    scheduler: AccrualScheduler,
    next_account: AtomicU64,
}

impl Platform {
    /// In-memory platform with default tuning
    pub fn new() -> PlatformResult<Self> {
        Self::with_config(PlatformConfig::default())
    }

    pub fn with_config(config: PlatformConfig) -> PlatformResult<Self> {
        let ledger = Arc::new(WalletLedger::new(config.ledger_store)?);
        let graph = Arc::new(ReferralGraph::new(config.referral_store));
        let commissions = CommissionEngine::with_policy(
            ledger.clone(),
            graph.clone(),
            config.commission_policy,
        );
        let staking = Arc::new(StakingEngine::new(ledger.clone(), config.position_store));
        let scheduler = AccrualScheduler::new(staking.clone(), config.scheduler);

        // Resume id allocation above anything the rebuilt ledger knows.
        let highest = ledger.account_ids()?.into_iter().map(|id| id.as_u64()).max();
        let next_account = AtomicU64::new(highest.map_or(1, |id| id + 1));

        Ok(Self {
            ledger,
            graph,
            commissions,
            staking,
            scheduler,
            next_account,
        })
    }

    // ========================================================================
    // ACCOUNTS & REFERRALS
    // ========================================================================

    /// Register a new user, optionally under a referrer.
    ///
    /// The referrer link is fixed at registration and immutable afterwards.
    /// A bad referrer (unknown account) fails the whole registration; no
    /// account is created.
    pub fn register_user(
        &self,
        referrer: Option<AccountId>,
        now: DateTime<Utc>,
    ) -> PlatformResult<AccountId> {
        if let Some(referrer) = referrer {
            // Surfaces AccountNotFound before we allocate anything.
            self.ledger.balance(referrer)?;
        }
        let account_id = AccountId::new(self.next_account.fetch_add(1, Ordering::SeqCst));
        self.ledger.open_account(account_id)?;
        if let Some(referrer) = referrer {
            self.graph.set_referrer(account_id, referrer, now)?;
        }
        info!(account = %account_id, referrer = ?referrer, "user registered");
        Ok(account_id)
    }

    pub fn referral_stats(&self, account_id: AccountId) -> PlatformResult<ReferralStats> {
        let network = self
            .graph
            .network_by_level(account_id, MAX_COMMISSION_DEPTH)?
            .iter()
            .map(Vec::len)
            .collect();
        let filter = EntryFilter {
            kind: Some(EntryKind::ReferralCommission),
            status: Some(EntryStatus::Completed),
            since: None,
        };
        let total_commission = self
            .ledger
            .transactions(account_id, &filter)?
            .iter()
            .map(LedgerEntry::magnitude)
            .sum();
        Ok(ReferralStats {
            account_id,
            network,
            total_commission,
        })
    }

    // ========================================================================
    // MONEY IN / MONEY OUT
    // ========================================================================

    /// Settle a confirmed deposit and fan out referral commissions.
    ///
    /// The deposit entry is written first; commission levels that fail are
    /// reported in the outcome without voiding the deposit.
    pub fn confirm_deposit(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> PlatformResult<DepositOutcome> {
        let entry = self.ledger.confirm_deposit(account_id, amount, external_ref, now)?;
        let commissions = self.commissions.distribute(&entry, now)?;
        Ok(DepositOutcome { entry, commissions })
    }

    /// Immediately-settled withdrawal, capped by the 24h ROI maturity rule
    pub fn confirm_withdrawal(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> PlatformResult<LedgerEntry> {
        Ok(self.ledger.confirm_withdrawal(account_id, amount, external_ref, now)?)
    }

    /// Open a withdrawal hold awaiting external settlement
    pub fn request_withdrawal(
        &self,
        account_id: AccountId,
        amount: Amount,
        external_ref: ExternalRef,
        now: DateTime<Utc>,
    ) -> PlatformResult<LedgerEntry> {
        Ok(self.ledger.request_withdrawal(account_id, amount, external_ref, now)?)
    }

    pub fn confirm_withdrawal_request(&self, entry_id: EntryId) -> PlatformResult<LedgerEntry> {
        Ok(self.ledger.confirm_withdrawal_request(entry_id)?)
    }

    pub fn reject_withdrawal_request(
        &self,
        entry_id: EntryId,
        now: DateTime<Utc>,
    ) -> PlatformResult<LedgerEntry> {
        Ok(self.ledger.reject_withdrawal_request(entry_id, now)?)
    }

    /// Operator adjustment, recorded like any other entry
    pub fn admin_adjust(
        &self,
        account_id: AccountId,
        amount: SignedAmount,
        bucket: lib_ledger::BalanceBucket,
        note: ExternalRef,
        now: DateTime<Utc>,
    ) -> PlatformResult<LedgerEntry> {
        Ok(self.ledger.admin_adjust(account_id, amount, bucket, note, now)?)
    }

    // ========================================================================
    // STAKING
    // ========================================================================

    pub fn open_stake(
        &self,
        account_id: AccountId,
        tier: Tier,
        principal: Amount,
        now: DateTime<Utc>,
    ) -> PlatformResult<StakePosition> {
        Ok(self.staking.open_stake(account_id, tier, principal, now)?)
    }

    pub fn close_stake(
        &self,
        position_id: PositionId,
        now: DateTime<Utc>,
    ) -> PlatformResult<LedgerEntry> {
        Ok(self.staking.close_stake(position_id, now)?)
    }

    /// Run the daily accrual over every active position.
    ///
    /// Idempotent per trading day; safe to invoke from more than one worker.
    pub async fn run_accrual(
        &self,
        trading_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> PlatformResult<AccrualRun> {
        Ok(self.scheduler.run_once(trading_day, now).await?)
    }

    /// Ask an in-flight accrual run to stop at the next position boundary
    pub fn cancel_accrual(&self) {
        self.scheduler.cancel();
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn balance(&self, account_id: AccountId) -> PlatformResult<Account> {
        Ok(self.ledger.balance(account_id)?)
    }

    pub fn withdrawable(
        &self,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> PlatformResult<Amount> {
        Ok(self.ledger.withdrawable(account_id, now)?)
    }

    pub fn transactions(
        &self,
        account_id: AccountId,
        filter: &EntryFilter,
    ) -> PlatformResult<Vec<LedgerEntry>> {
        Ok(self.ledger.transactions(account_id, filter)?)
    }

    pub fn stake_positions(&self, account_id: AccountId) -> PlatformResult<Vec<StakePosition>> {
        Ok(self.staking.stake_positions(account_id)?)
    }

    /// Rebuild every balance snapshot from the entry log
    pub fn rebuild(&self) -> PlatformResult<()> {
        Ok(self.ledger.rebuild()?)
    }

    /// Direct subsystem access for callers that outgrow the facade
    pub fn ledger(&self) -> &Arc<WalletLedger> {
        &self.ledger
    }

    pub fn referral_graph(&self) -> &Arc<ReferralGraph> {
        &self.graph
    }
}
