//! Canonical Primitive Types for the Meridian Ledger Core
//!
//! Rule: no floating-point money, no string identifiers in ledger state.
//!
//! These types are the foundational building blocks for every ledger-critical
//! data structure. They are designed to be:
//! - Fixed-size (no dynamic allocation on the hot path)
//! - Deterministically serializable
//! - Efficient to copy and compare

pub mod primitives;

pub use primitives::*;
