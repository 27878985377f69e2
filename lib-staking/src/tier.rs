//! Staking tier definitions.
//!
//! A tier is a staking plan: minimum capital, daily ROI range, capital lock
//! period, and how many days per week it accrues. The four tiers form a
//! ladder — higher minimums buy wider (and higher) daily ranges, longer
//! locks, and denser trading calendars.
//!
//! All parameters are integer: amounts in minor units, rates in daily basis
//! points.

use lib_types::{Amount, Bps};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Staking plan identifiers, in ascending capital order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    Anchor = 1,
    Vector = 2,
    Kinetic = 3,
    Horizon = 4,
}

/// Static parameters of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierParams {
    /// Smallest principal the tier accepts, in minor units
    pub min_capital: Amount,
    /// Lower bound of the daily ROI draw, basis points
    pub daily_roi_min: Bps,
    /// Upper bound of the daily ROI draw, basis points (inclusive)
    pub daily_roi_max: Bps,
    /// Capital lock period in days
    pub lock_days: i64,
    /// How many weekdays per week accrue, Monday-first (5 = Mon..Fri)
    pub trading_days_per_week: u8,
}

impl Tier {
    /// All tiers in stable order
    pub const ALL: &'static [Tier] = &[Tier::Anchor, Tier::Vector, Tier::Kinetic, Tier::Horizon];

    /// Static parameter table
    pub const fn params(self) -> TierParams {
        match self {
            Tier::Anchor => TierParams {
                min_capital: 10_000, // 100.00
                daily_roi_min: 50,   // 0.50%
                daily_roi_max: 80,   // 0.80%
                lock_days: 30,
                trading_days_per_week: 5,
            },
            Tier::Vector => TierParams {
                min_capital: 100_000, // 1,000.00
                daily_roi_min: 80,
                daily_roi_max: 120,
                lock_days: 45,
                trading_days_per_week: 5,
            },
            Tier::Kinetic => TierParams {
                min_capital: 500_000, // 5,000.00
                daily_roi_min: 110,
                daily_roi_max: 170,
                lock_days: 60,
                trading_days_per_week: 6,
            },
            Tier::Horizon => TierParams {
                min_capital: 2_500_000, // 25,000.00
                daily_roi_min: 150,
                daily_roi_max: 230,
                lock_days: 90,
                trading_days_per_week: 7,
            },
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tier::Anchor => "Anchor",
            Tier::Vector => "Vector",
            Tier::Kinetic => "Kinetic",
            Tier::Horizon => "Horizon",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
