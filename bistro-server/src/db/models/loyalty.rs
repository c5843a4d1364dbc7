//! Loyalty Record Model
//!
//! One record per user; transactions are append-only.
//! Invariant: current_points = points_earned − points_redeemed, never negative.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earn,
    Redeem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub kind: TransactionKind,
    pub points: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub order_id: Option<RecordId>,
    pub at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyRecord {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(default)]
    pub points_earned: i64,
    #[serde(default)]
    pub points_redeemed: i64,
    #[serde(default)]
    pub current_points: i64,
    #[serde(default)]
    pub transactions: Vec<LoyaltyTransaction>,
}

impl LoyaltyRecord {
    /// Fresh record for a user's first earn event
    pub fn empty(user: RecordId) -> Self {
        Self {
            id: None,
            user,
            points_earned: 0,
            points_redeemed: 0,
            current_points: 0,
            transactions: vec![],
        }
    }
}
