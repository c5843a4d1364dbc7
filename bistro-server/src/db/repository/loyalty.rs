//! Loyalty Repository
//!
//! Callers serialize per-user access (the service layer holds a per-user
//! lock), so earn/redeem here can assume no interleaved writer for the
//! same record.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{LoyaltyRecord, LoyaltyTransaction};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct LoyaltyRepository {
    base: BaseRepository,
}

impl LoyaltyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_user(&self, user_id: &RecordId) -> RepoResult<Option<LoyaltyRecord>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM loyalty WHERE user = $user LIMIT 1")
            .bind(("user", user_id.to_string()))
            .await?;
        let records: Vec<LoyaltyRecord> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    pub async fn create(&self, record: LoyaltyRecord) -> RepoResult<LoyaltyRecord> {
        let created: Option<LoyaltyRecord> =
            self.base.db().create("loyalty").content(record).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create loyalty record".to_string()))
    }

    pub async fn apply_earn(
        &self,
        id: &RecordId,
        points: i64,
        transaction: LoyaltyTransaction,
    ) -> RepoResult<LoyaltyRecord> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $rec SET \
                 points_earned += $points, \
                 current_points += $points, \
                 transactions += $txn \
                 RETURN AFTER",
            )
            .bind(("rec", id.clone()))
            .bind(("points", points))
            .bind(("txn", transaction))
            .await?;
        let records: Vec<LoyaltyRecord> = result.take(0)?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Loyalty record not found: {}", id)))
    }

    pub async fn apply_redeem(
        &self,
        id: &RecordId,
        points: i64,
        transaction: LoyaltyTransaction,
    ) -> RepoResult<LoyaltyRecord> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $rec SET \
                 points_redeemed += $points, \
                 current_points -= $points, \
                 transactions += $txn \
                 RETURN AFTER",
            )
            .bind(("rec", id.clone()))
            .bind(("points", points))
            .bind(("txn", transaction))
            .await?;
        let records: Vec<LoyaltyRecord> = result.take(0)?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Loyalty record not found: {}", id)))
    }
}
