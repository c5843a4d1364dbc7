//! User Repository
//!
//! Loyalty counters on the user document are only ever moved with `+=`
//! updates so concurrent orders never clobber each other's increments.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, VipTier};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self.base.db().create("user").content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<User> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        user.ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    /// Atomically bump the post-order counters
    pub async fn apply_order_counters(
        &self,
        id: &RecordId,
        points_delta: i64,
        amount_spent: f64,
    ) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $user SET \
                 loyalty_points += $points, \
                 total_spent += $amount, \
                 order_count += 1 \
                 RETURN AFTER",
            )
            .bind(("user", id.clone()))
            .bind(("points", points_delta))
            .bind(("amount", amount_spent))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    /// Deduct redeemed points from the running balance
    pub async fn deduct_points(&self, id: &RecordId, points: i64) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET loyalty_points -= $points RETURN AFTER")
            .bind(("user", id.clone()))
            .bind(("points", points))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    pub async fn set_vip_status(
        &self,
        id: &RecordId,
        tier: Option<VipTier>,
        since: Option<i64>,
        expires_at: Option<i64>,
    ) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $user SET \
                 is_vip = $is_vip, \
                 vip_tier = $tier, \
                 vip_since = $since, \
                 vip_expires_at = $expires_at \
                 RETURN AFTER",
            )
            .bind(("user", id.clone()))
            .bind(("is_vip", tier.is_some()))
            .bind(("tier", tier.map(|t| t.as_str().to_string())))
            .bind(("since", since))
            .bind(("expires_at", expires_at))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }

    /// Extend an existing VIP membership's expiry
    pub async fn set_vip_expiry(&self, id: &RecordId, expires_at: Option<i64>) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET vip_expires_at = $expires_at RETURN AFTER")
            .bind(("user", id.clone()))
            .bind(("expires_at", expires_at))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User not found: {}", id)))
    }
}
