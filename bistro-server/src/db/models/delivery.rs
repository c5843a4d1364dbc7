//! Delivery Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    PickedUp,
    InTransit,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    /// Terminal states free the assigned rider
    pub const fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }
}

/// Delivery entity linking an order to a rider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub rider_id: RecordId,
    pub status: DeliveryStatus,
    /// Free-text current location ("5th and Main")
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub eta_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
}
