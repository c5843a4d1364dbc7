//! Rider Dispatch Module
//!
//! Nearest-rider assignment for delivery orders and delivery status
//! tracking. Assignment races are resolved with a compare-and-set claim on
//! the rider's availability flag.

mod dispatcher;

pub use dispatcher::RiderDispatch;
