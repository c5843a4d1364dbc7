//! Rider Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Delivery rider entity
///
/// A rider with `availability == false` should have at least one assigned
/// delivery pending completion; violations are tolerated, not fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub phone: String,
    /// e.g. bike, car, van
    pub vehicle: String,
    #[serde(default = "default_true")]
    pub availability: bool,
    /// Last known location, updated by the rider app
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub assigned_deliveries: Vec<RecordId>,
}

fn default_true() -> bool {
    true
}
