//! Loyalty Service
//!
//! Earn rule: floor(amount / divisor) points, doubled for effective VIPs.
//! Qualification is upgrade-only; tiers are granted for one year and read
//! through `User::effective_tier` so lapsed memberships lose benefits
//! without a background job.

use crate::core::config::Policy;
use crate::db::models::{
    LoyaltyRecord, LoyaltyTransaction, TransactionKind, User, VipTier,
};
use crate::db::repository::{LoyaltyRepository, UserRepository};
use crate::utils::{self, AppError, ErrorCode};
use dashmap::DashMap;
use std::sync::Arc;
use surrealdb::RecordId;
use tokio::sync::Mutex;

const VIP_TERM_MILLIS: i64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct LoyaltyService {
    users: UserRepository,
    loyalty: LoyaltyRepository,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    policy: Policy,
}

impl LoyaltyService {
    pub fn new(users: UserRepository, loyalty: LoyaltyRepository, policy: Policy) -> Self {
        Self {
            users,
            loyalty,
            locks: Arc::new(DashMap::new()),
            policy,
        }
    }

    fn lock_for(&self, user_id: &RecordId) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a user's lock slot once no task holds a handle to it, keeping
    /// the map bounded by the number of in-flight mutations. The shard
    /// stays locked through the strong-count check, so a concurrent
    /// `lock_for` either finishes before the removal or re-inserts a
    /// fresh slot after it.
    fn evict_lock(&self, user_id: &RecordId) {
        self.locks
            .remove_if(&user_id.to_string(), |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Points earned on a paid amount for an effective tier
    pub fn points_for(&self, amount: f64, tier: Option<VipTier>) -> i64 {
        let base = (amount / self.policy.earn_divisor).floor() as i64;
        if tier.is_some() {
            base * self.policy.vip_earn_multiplier
        } else {
            base
        }
    }

    /// Credit points for a paid order and bump the user's lifetime counters.
    /// Returns the updated user and the points awarded.
    pub async fn accrue(
        &self,
        user_id: &RecordId,
        order_id: &RecordId,
        amount: f64,
    ) -> Result<(User, i64), AppError> {
        let lock = self.lock_for(user_id);
        let guard = lock.lock().await;
        let result = self.accrue_locked(user_id, order_id, amount).await;
        drop(guard);
        drop(lock);
        self.evict_lock(user_id);
        result
    }

    async fn accrue_locked(
        &self,
        user_id: &RecordId,
        order_id: &RecordId,
        amount: f64,
    ) -> Result<(User, i64), AppError> {
        let user = self.users.find_by_id(user_id).await?;
        let now = utils::now_millis();
        let points = self.points_for(amount, user.effective_tier(now));

        let updated = self
            .users
            .apply_order_counters(user_id, points, amount)
            .await?;

        let record = match self.loyalty.find_by_user(user_id).await? {
            Some(record) => record,
            None => self.loyalty.create(LoyaltyRecord::empty(user_id.clone())).await?,
        };
        let record_id = record
            .id
            .ok_or_else(|| AppError::database("Loyalty record missing id"))?;
        self.loyalty
            .apply_earn(
                &record_id,
                points,
                LoyaltyTransaction {
                    kind: TransactionKind::Earn,
                    points,
                    description: Some(format!("Order {order_id}")),
                    order_id: Some(order_id.clone()),
                    at: now,
                },
            )
            .await?;

        tracing::debug!(user = %user_id, points, "Loyalty points accrued");
        Ok((updated, points))
    }

    /// Redeem points from a user's balance
    pub async fn redeem(
        &self,
        user_id: &RecordId,
        points: i64,
        description: Option<String>,
    ) -> Result<LoyaltyRecord, AppError> {
        if points < 1 {
            return Err(AppError::validation("Points to redeem must be positive"));
        }
        let lock = self.lock_for(user_id);
        let guard = lock.lock().await;
        let result = self.redeem_locked(user_id, points, description).await;
        drop(guard);
        drop(lock);
        self.evict_lock(user_id);
        result
    }

    async fn redeem_locked(
        &self,
        user_id: &RecordId,
        points: i64,
        description: Option<String>,
    ) -> Result<LoyaltyRecord, AppError> {
        let record = self
            .loyalty
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::LoyaltyNotFound))?;
        if record.current_points < points {
            return Err(AppError::with_message(
                ErrorCode::InsufficientPoints,
                format!(
                    "Balance is {} points, cannot redeem {}",
                    record.current_points, points
                ),
            ));
        }

        let record_id = record
            .id
            .ok_or_else(|| AppError::database("Loyalty record missing id"))?;
        let updated = self
            .loyalty
            .apply_redeem(
                &record_id,
                points,
                LoyaltyTransaction {
                    kind: TransactionKind::Redeem,
                    points,
                    description,
                    order_id: None,
                    at: utils::now_millis(),
                },
            )
            .await?;
        self.users.deduct_points(user_id, points).await?;
        Ok(updated)
    }

    /// Loyalty record for a user; a user who never earned gets an empty view
    pub async fn view(&self, user_id: &RecordId) -> Result<LoyaltyRecord, AppError> {
        // Existence check keeps "unknown user" distinct from "no points yet"
        self.users.find_by_id(user_id).await.map_err(|_| {
            AppError::new(ErrorCode::UserNotFound)
        })?;
        Ok(self
            .loyalty
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| LoyaltyRecord::empty(user_id.clone())))
    }

    /// Tier the user's lifetime history qualifies them for
    fn qualified_tier(&self, user: &User, lifetime_points: i64) -> Option<VipTier> {
        if user.order_count < self.policy.vip_min_orders
            || user.total_spent < self.policy.vip_min_spend
        {
            return None;
        }
        if lifetime_points >= self.policy.platinum_points {
            Some(VipTier::Platinum)
        } else if lifetime_points >= self.policy.gold_points {
            Some(VipTier::Gold)
        } else if lifetime_points >= self.policy.silver_points {
            Some(VipTier::Silver)
        } else {
            None
        }
    }

    /// Re-evaluate VIP qualification after an order. Upgrade-only: an
    /// existing effective tier is never lowered here. Returns the new tier
    /// when an upgrade happened.
    pub async fn evaluate_qualification(
        &self,
        user_id: &RecordId,
    ) -> Result<Option<VipTier>, AppError> {
        let lock = self.lock_for(user_id);
        let guard = lock.lock().await;
        let result = self.evaluate_locked(user_id).await;
        drop(guard);
        drop(lock);
        self.evict_lock(user_id);
        result
    }

    async fn evaluate_locked(&self, user_id: &RecordId) -> Result<Option<VipTier>, AppError> {
        let user = self.users.find_by_id(user_id).await?;
        let lifetime_points = self
            .loyalty
            .find_by_user(user_id)
            .await?
            .map(|r| r.points_earned)
            .unwrap_or(0);

        let now = utils::now_millis();
        let current = user.effective_tier(now);
        let qualified = self.qualified_tier(&user, lifetime_points);

        match qualified {
            Some(tier) if current.is_none_or(|c| tier > c) => {
                self.users
                    .set_vip_status(user_id, Some(tier), Some(now), Some(now + VIP_TERM_MILLIS))
                    .await?;
                tracing::info!(user = %user_id, tier = tier.as_str(), "VIP tier granted");
                Ok(Some(tier))
            }
            _ => Ok(None),
        }
    }

    /// Manually grant a tier (admin)
    pub async fn grant(
        &self,
        user_id: &RecordId,
        tier: VipTier,
        term_days: Option<i64>,
    ) -> Result<User, AppError> {
        let now = utils::now_millis();
        let expires = term_days
            .map(|d| now + d * 24 * 60 * 60 * 1000)
            .or(Some(now + VIP_TERM_MILLIS));
        Ok(self
            .users
            .set_vip_status(user_id, Some(tier), Some(now), expires)
            .await?)
    }

    /// Revoke VIP status (admin)
    pub async fn revoke(&self, user_id: &RecordId) -> Result<User, AppError> {
        Ok(self.users.set_vip_status(user_id, None, None, None).await?)
    }

    /// Push a membership's expiry out by `days` (admin)
    pub async fn extend(&self, user_id: &RecordId, days: i64) -> Result<User, AppError> {
        if days < 1 {
            return Err(AppError::validation("Extension must be at least one day"));
        }
        let user = self.users.find_by_id(user_id).await?;
        if !user.is_vip {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "User has no VIP membership to extend",
            ));
        }
        let base = user.vip_expires_at.unwrap_or_else(utils::now_millis);
        let expires = base.max(utils::now_millis()) + days * 24 * 60 * 60 * 1000;
        Ok(self.users.set_vip_expiry(user_id, Some(expires)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn setup() -> (LoyaltyService, UserRepository, RecordId) {
        let db = DbService::open_memory().await.unwrap();
        let users = UserRepository::new(db.db.clone());
        let loyalty = LoyaltyRepository::new(db.db.clone());
        let user = users
            .create(User {
                id: None,
                name: "Kofi".into(),
                email: "kofi@example.com".into(),
                phone: "+233200000001".into(),
                role: None,
                loyalty_points: 0,
                total_spent: 0.0,
                order_count: 0,
                is_vip: false,
                vip_tier: None,
                vip_since: None,
                vip_expires_at: None,
            })
            .await
            .unwrap();
        let service = LoyaltyService::new(users.clone(), loyalty, Policy::default());
        (service, users, user.id.unwrap())
    }

    fn order_id() -> RecordId {
        "orders:o1".parse().unwrap()
    }

    #[tokio::test]
    async fn earn_is_floor_of_amount_over_ten() {
        let (service, _, _) = setup().await;
        assert_eq!(service.points_for(0.0, None), 0);
        assert_eq!(service.points_for(9.99, None), 0);
        assert_eq!(service.points_for(47.0, None), 4);
        assert_eq!(service.points_for(47.0, Some(VipTier::Gold)), 8);
    }

    #[tokio::test]
    async fn accrue_updates_user_and_ledger() {
        let (service, _, user_id) = setup().await;
        let (user, points) = service.accrue(&user_id, &order_id(), 42.0).await.unwrap();
        assert_eq!(points, 4);
        assert_eq!(user.loyalty_points, 4);
        assert_eq!(user.order_count, 1);
        assert_eq!(user.total_spent, 42.0);

        let record = service.view(&user_id).await.unwrap();
        assert_eq!(record.current_points, 4);
        assert_eq!(record.points_earned, 4);
        assert_eq!(record.transactions.len(), 1);
        assert_eq!(record.transactions[0].kind, TransactionKind::Earn);
    }

    #[tokio::test]
    async fn redeem_rejects_insufficient_balance() {
        let (service, _, user_id) = setup().await;
        service.accrue(&user_id, &order_id(), 100.0).await.unwrap();

        let err = service.redeem(&user_id, 50, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientPoints);

        let record = service.redeem(&user_id, 10, None).await.unwrap();
        assert_eq!(record.current_points, 0);
        assert_eq!(record.points_redeemed, 10);
    }

    #[tokio::test]
    async fn per_user_lock_slots_are_reclaimed() {
        let (service, _, user_id) = setup().await;
        service.accrue(&user_id, &order_id(), 42.0).await.unwrap();
        service.redeem(&user_id, 2, None).await.unwrap();
        service.evaluate_qualification(&user_id).await.unwrap();
        // Idle users leave nothing behind in the lock map
        assert!(service.locks.is_empty());
    }

    #[tokio::test]
    async fn qualification_requires_all_three_gates() {
        let (service, users, user_id) = setup().await;
        // 1200 lifetime points but only 3 orders: not qualified
        for _ in 0..3 {
            service.accrue(&user_id, &order_id(), 4000.0).await.unwrap();
        }
        let user = users.find_by_id(&user_id).await.unwrap();
        assert!(user.loyalty_points >= 1200);
        assert_eq!(service.evaluate_qualification(&user_id).await.unwrap(), None);

        // Two more orders pass the order-count gate
        for _ in 0..2 {
            service.accrue(&user_id, &order_id(), 10.0).await.unwrap();
        }
        let granted = service.evaluate_qualification(&user_id).await.unwrap();
        assert_eq!(granted, Some(VipTier::Silver));

        let user = users.find_by_id(&user_id).await.unwrap();
        assert!(user.is_vip);
        assert_eq!(user.vip_tier, Some(VipTier::Silver));
        assert!(user.vip_expires_at.is_some());
    }

    #[tokio::test]
    async fn qualification_never_downgrades() {
        let (service, users, user_id) = setup().await;
        service.grant(&user_id, VipTier::Platinum, None).await.unwrap();

        for _ in 0..6 {
            service.accrue(&user_id, &order_id(), 100.0).await.unwrap();
        }
        // Lifetime points only qualify for silver; platinum stands
        assert_eq!(service.evaluate_qualification(&user_id).await.unwrap(), None);
        let user = users.find_by_id(&user_id).await.unwrap();
        assert_eq!(user.vip_tier, Some(VipTier::Platinum));
    }

    #[tokio::test]
    async fn extend_pushes_expiry_forward() {
        let (service, users, user_id) = setup().await;
        service.grant(&user_id, VipTier::Gold, Some(30)).await.unwrap();
        let before = users.find_by_id(&user_id).await.unwrap().vip_expires_at.unwrap();

        service.extend(&user_id, 30).await.unwrap();
        let after = users.find_by_id(&user_id).await.unwrap().vip_expires_at.unwrap();
        assert_eq!(after - before, 30 * 24 * 60 * 60 * 1000);
    }

    #[tokio::test]
    async fn extend_requires_membership() {
        let (service, _, user_id) = setup().await;
        let err = service.extend(&user_id, 30).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
