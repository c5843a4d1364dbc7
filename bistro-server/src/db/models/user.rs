//! User Model (VIP status fields)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// VIP membership tier, ordered lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VipTier {
    Silver,
    Gold,
    Platinum,
}

impl VipTier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VipTier::Silver => "silver",
            VipTier::Gold => "gold",
            VipTier::Platinum => "platinum",
        }
    }
}

/// User entity
///
/// Carries the running loyalty counters and the VIP status fields.
/// Invariant: `vip_tier` is non-null iff `is_vip` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub loyalty_points: i64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub order_count: i64,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub vip_tier: Option<VipTier>,
    /// Epoch millis when VIP status was granted
    #[serde(default)]
    pub vip_since: Option<i64>,
    /// Epoch millis when VIP status lapses; None means no expiry
    #[serde(default)]
    pub vip_expires_at: Option<i64>,
}

impl User {
    /// Tier with expiry enforced lazily: an expired `vip_expires_at` reads
    /// as non-VIP everywhere benefits are computed. The stored flag is
    /// corrected the next time qualification is evaluated.
    pub fn effective_tier(&self, now_millis: i64) -> Option<VipTier> {
        if !self.is_vip {
            return None;
        }
        if let Some(expires) = self.vip_expires_at
            && expires <= now_millis
        {
            return None;
        }
        self.vip_tier
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vip_user(tier: VipTier, expires_at: Option<i64>) -> User {
        User {
            id: None,
            name: "Ama".into(),
            email: "ama@example.com".into(),
            phone: "+233200000001".into(),
            role: None,
            loyalty_points: 0,
            total_spent: 0.0,
            order_count: 0,
            is_vip: true,
            vip_tier: Some(tier),
            vip_since: Some(1_000),
            vip_expires_at: expires_at,
        }
    }

    #[test]
    fn tier_ordering() {
        assert!(VipTier::Silver < VipTier::Gold);
        assert!(VipTier::Gold < VipTier::Platinum);
    }

    #[test]
    fn effective_tier_respects_expiry() {
        let user = vip_user(VipTier::Gold, Some(5_000));
        assert_eq!(user.effective_tier(4_999), Some(VipTier::Gold));
        assert_eq!(user.effective_tier(5_000), None);
        assert_eq!(user.effective_tier(9_000), None);
    }

    #[test]
    fn effective_tier_without_expiry() {
        let user = vip_user(VipTier::Platinum, None);
        assert_eq!(user.effective_tier(i64::MAX), Some(VipTier::Platinum));
    }
}
