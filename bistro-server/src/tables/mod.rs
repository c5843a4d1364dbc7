//! Table Allocation Module
//!
//! Hold/release state machine over the dining_table table. The allocator
//! layers hold-expiry policy on top of the repository's compare-and-set
//! reserve; the periodic sweeper lives in `core::tasks`.

mod allocator;

pub use allocator::{TableAllocator, TableHold};
