//! Order Module
//!
//! The orchestrator drives the whole create/cancel/status lifecycle:
//! validation and pricing up front, a single persistence commit point, then
//! best-effort side effects (table calendar, loyalty, dispatch, SMS) whose
//! failures are recorded on the order instead of failing the request.

mod orchestrator;

pub use orchestrator::{CreateOrderInput, OrderItemInput, OrderOrchestrator};
