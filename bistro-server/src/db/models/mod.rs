//! Database Models
//!
//! Entity documents persisted in SurrealDB. Record links are serialized as
//! "table:id" strings at the API boundary.

pub mod serde_helpers;

pub mod delivery;
pub mod dining_table;
pub mod loyalty;
pub mod menu_item;
pub mod order;
pub mod rider;
pub mod user;

pub use delivery::{Delivery, DeliveryStatus};
pub use dining_table::{DiningTable, DiningTableCreate, TableLocation, TableType};
pub use loyalty::{LoyaltyRecord, LoyaltyTransaction, TransactionKind};
pub use menu_item::MenuItem;
pub use order::{
    Cancellation, DeliveryType, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
    TableReservationSnapshot,
};
pub use rider::{GeoPoint, Rider};
pub use user::{User, VipTier};
