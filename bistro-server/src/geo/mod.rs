//! Geo Module
//!
//! Distance math and the delivery fee/radius policy.

mod estimator;
mod haversine;

pub use estimator::{DeliveryEstimator, DeliveryQuote};
pub use haversine::haversine_km;
