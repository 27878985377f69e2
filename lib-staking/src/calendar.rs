//! Trading calendar.
//!
//! A tier accrues on the first `trading_days_per_week` weekdays of the week,
//! Monday-first. Off-days are skipped without error; the scheduler simply
//! reports them as skipped.

use crate::tier::Tier;
use chrono::{Datelike, NaiveDate};

/// Whether `day` is an accruing day for `tier`
pub fn is_trading_day(tier: Tier, day: NaiveDate) -> bool {
    day.weekday().num_days_from_monday() < tier.params().trading_days_per_week as u32
}
