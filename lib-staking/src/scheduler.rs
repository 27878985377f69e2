//! Daily ROI accrual scheduler.
//!
//! An external cron-like trigger calls [`AccrualScheduler::run_once`] once
//! per trading day. Correctness does not depend on exactly-once delivery:
//! the per-day idempotency key inside the engine makes redundant or
//! overlapping runs safe, so the trigger only needs at-least-once semantics.
//!
//! A run fans accrual out over a bounded worker pool (one task per position,
//! capped by a semaphore). Per-position failures are isolated: transient
//! storage errors are retried with bounded backoff, everything else is
//! collected into the run report without blocking other positions.
//! Cancellation is checked between positions, never mid-entry.

use crate::engine::{Accrual, StakingEngine};
use crate::errors::{StakeError, StakeResult};
use chrono::{DateTime, NaiveDate, Utc};
use lib_types::PositionId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Tunables for one scheduler instance
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum positions accruing concurrently
    pub max_concurrency: usize,
    /// Attempts per position for transient storage errors (>= 1)
    pub retry_attempts: u32,
    /// Linear backoff unit between attempts
    pub retry_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// One position's unrecovered failure within a run
#[derive(Debug, Clone)]
pub struct AccrualFailure {
    pub position_id: PositionId,
    pub error: StakeError,
    /// How many attempts were made before giving up
    pub attempts: u32,
}

/// Report for one `run_once` invocation
#[derive(Debug, Clone, Default)]
pub struct AccrualRun {
    pub credited: usize,
    pub already_accrued: usize,
    pub skipped: usize,
    pub failures: Vec<AccrualFailure>,
    /// Whether the run stopped early at a cancellation check
    pub cancelled: bool,
}

/// Fans daily accrual out across all active positions
pub struct AccrualScheduler {
    engine: Arc<StakingEngine>,
    config: SchedulerConfig,
    cancelled: Arc<AtomicBool>,
}

impl AccrualScheduler {
    pub fn new(engine: Arc<StakingEngine>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that in-flight and future runs stop at the next position
    /// boundary. Sticky until [`reset`](Self::reset).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Accrue `trading_day` for every active position.
    ///
    /// Returns `Err` only if the position listing itself fails; per-position
    /// outcomes land in the report. Safe to call again for the same day.
    pub async fn run_once(
        &self,
        trading_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> StakeResult<AccrualRun> {
        let positions = self.engine.active_positions()?;
        info!(
            day = %trading_day,
            positions = positions.len(),
            "accrual run starting"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut handles = Vec::with_capacity(positions.len());
        let mut run = AccrualRun::default();

        for position in positions {
            // Cancellation boundary: between positions, never mid-entry.
            if self.cancelled.load(Ordering::SeqCst) {
                run.cancelled = true;
                break;
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| StakeError::Storage(format!("worker pool closed: {e}")))?;
            let engine = self.engine.clone();
            let config = self.config.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                accrue_with_retry(&engine, position.id, trading_day, now, &config).await
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(Ok(Accrual::Credited(_))) => run.credited += 1,
                Ok(Ok(Accrual::AlreadyAccrued(_))) => run.already_accrued += 1,
                Ok(Ok(Accrual::Skipped(_))) => run.skipped += 1,
                Ok(Err(failure)) => {
                    warn!(
                        position = %failure.position_id,
                        attempts = failure.attempts,
                        error = %failure.error,
                        "accrual failed"
                    );
                    run.failures.push(failure);
                }
                Err(join_err) => {
                    // A panicked worker is reported, not propagated; the run
                    // carries on for the remaining positions.
                    warn!(error = %join_err, "accrual worker panicked");
                    run.failures.push(AccrualFailure {
                        position_id: PositionId::default(),
                        error: StakeError::Storage(format!("worker panicked: {join_err}")),
                        attempts: 1,
                    });
                }
            }
        }

        self.engine.mature_positions(now)?;

        info!(
            day = %trading_day,
            credited = run.credited,
            already = run.already_accrued,
            skipped = run.skipped,
            failures = run.failures.len(),
            cancelled = run.cancelled,
            "accrual run finished"
        );
        Ok(run)
    }
}

/// Retry transient errors with linear backoff; surface everything else
/// immediately.
async fn accrue_with_retry(
    engine: &StakingEngine,
    position_id: PositionId,
    trading_day: NaiveDate,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> Result<Accrual, AccrualFailure> {
    let attempts_allowed = config.retry_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match engine.accrue(position_id, trading_day, now) {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_transient() && attempt < attempts_allowed => {
                tokio::time::sleep(config.retry_backoff * attempt).await;
            }
            Err(e) => {
                return Err(AccrualFailure {
                    position_id,
                    error: e,
                    attempts: attempt,
                })
            }
        }
    }
}
