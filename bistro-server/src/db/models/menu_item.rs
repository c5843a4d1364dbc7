//! Menu Item Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Menu item entity (菜品)
///
/// The order pipeline only reads this table; catalog administration lives
/// outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Kitchen preparation time in minutes
    #[serde(default = "default_prep_minutes")]
    pub preparation_minutes: i64,
}

fn default_true() -> bool {
    true
}

fn default_prep_minutes() -> i64 {
    10
}
