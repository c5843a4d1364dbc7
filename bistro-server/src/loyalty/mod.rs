//! Loyalty Module
//!
//! Points accrual/redemption and VIP qualification. All writes for one
//! user run under a per-user async lock so earn, redeem and qualification
//! never interleave for the same account.

mod service;

pub use service::LoyaltyService;
