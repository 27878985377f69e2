//! Meridian Staking Engine
//!
//! Manages stake positions against tier definitions and accrues tiered daily
//! returns on staked capital. All fund movement goes through the wallet
//! ledger; this crate owns position lifecycle, the trading calendar, the
//! deterministic ROI draw, and the accrual scheduler.
//!
//! # Key Types
//!
//! - [`Tier`]: staking plan (minimum capital, daily ROI range, lock period,
//!   trading-day cadence)
//! - [`StakePosition`]: one active stake
//! - [`StakingEngine`]: open / close / accrue, with per-day idempotency
//! - [`AccrualScheduler`]: bounded-concurrency daily sweep, safe under
//!   at-least-once invocation
//!
//! # Invariants
//!
//! - **S1**: `principal >= tier.min_capital`
//! - **S2**: principal never returns to `available` before `unlocks_at`
//! - **S3**: at most one ROI payout per `(position, trading day)` — the
//!   idempotency key that makes redundant scheduler runs safe
//! - **S4**: the daily rate is a deterministic draw bounded by the tier's
//!   ROI range, reproducible from `(position_id, trading_day)` alone

pub mod calendar;
pub mod engine;
pub mod errors;
pub mod position;
pub mod roi;
pub mod scheduler;
pub mod store;
pub mod tier;

pub use calendar::is_trading_day;
pub use engine::{Accrual, SkipReason, StakingEngine};
pub use errors::{StakeError, StakeResult};
pub use position::{NewPosition, PositionStatus, StakePosition};
pub use roi::{daily_payout, daily_rate_bps};
pub use scheduler::{AccrualFailure, AccrualRun, AccrualScheduler, SchedulerConfig};
pub use store::{MemoryPositionStore, PositionStore};
pub use tier::{Tier, TierParams};
