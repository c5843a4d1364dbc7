//! Pricing Module
//!
//! Pure order-price calculation; no database or clock access so the
//! arithmetic is trivially testable. All money math runs on `Decimal`
//! and crosses back to `f64` only at the storage boundary.

mod calculator;
pub mod money;

pub use calculator::*;
pub use money::round2;
