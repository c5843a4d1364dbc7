//! Dining Table Model
//!
//! State machine: Available → Held → Available. Invariant:
//! `is_available == false` ⇔ `holder` is set ⇔ `release_at` is set.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    Regular,
    VipSection,
    PremiumWindowSeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLocation {
    Indoor,
    Outdoor,
    Balcony,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub table_number: i64,
    pub table_type: TableType,
    pub capacity: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub holder: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub reserved_order: Option<RecordId>,
    /// Epoch millis the hold was taken
    #[serde(default)]
    pub reserved_at: Option<i64>,
    /// Epoch millis the hold auto-expires; the sweeper force-releases past
    /// this point regardless of holder
    #[serde(default)]
    pub release_at: Option<i64>,
    #[serde(default = "default_location")]
    pub location: TableLocation,
}

fn default_true() -> bool {
    true
}

fn default_location() -> TableLocation {
    TableLocation::Indoor
}

/// Create dining table payload (seeding / admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub table_number: i64,
    pub table_type: TableType,
    pub capacity: i64,
    #[serde(default = "default_location")]
    pub location: TableLocation,
}
