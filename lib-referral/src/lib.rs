//! Meridian Referral Network
//!
//! A read-mostly forest mapping each user to their direct referrer, plus the
//! commission engine that fans a qualifying deposit out to up to five levels
//! of upline at decaying percentages.
//!
//! # Key Types
//!
//! - [`ReferralGraph`]: one immutable referrer per user, cycle-checked at
//!   write time, ancestor and descendant traversal
//! - [`CommissionEngine`]: walks the upline of a completed deposit and
//!   credits each level independently
//!
//! # Invariants
//!
//! - **R1**: the graph is a forest — no cycles, at most one referrer per
//!   user, assigned once at registration and immutable
//! - **R2**: commission totals are bounded — the level table sums to a fixed
//!   share of the deposit (enforced at compile time)
//! - **R3**: one level's failed credit never blocks another level's

pub mod commission;
pub mod errors;
pub mod graph;

pub use commission::{
    CommissionEngine, CommissionFailure, CommissionPolicy, CommissionReport, commission_rate,
    COMMISSION_LEVELS, MAX_COMMISSION_DEPTH,
};
pub use errors::{ReferralError, ReferralResult};
pub use graph::{Descendants, MemoryReferralStore, ReferralEdge, ReferralGraph, ReferralStore};
