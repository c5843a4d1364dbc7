//! Rider Repository
//!
//! Claiming a rider is a compare-and-set on the availability flag; the
//! dispatcher ranks candidates itself and retries on a lost race.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Rider;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct RiderRepository {
    base: BaseRepository,
}

impl RiderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, rider: Rider) -> RepoResult<Rider> {
        let created: Option<Rider> = self.base.db().create("rider").content(rider).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create rider".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Rider> {
        let rider: Option<Rider> = self.base.db().select(id.clone()).await?;
        rider.ok_or_else(|| RepoError::NotFound(format!("Rider not found: {}", id)))
    }

    pub async fn find_available(&self) -> RepoResult<Vec<Rider>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM rider WHERE availability = true ORDER BY id ASC")
            .await?;
        Ok(result.take(0)?)
    }

    /// Flip availability to false only if it is still true. Returns None
    /// when another dispatch claimed this rider first.
    pub async fn claim(&self, id: &RecordId) -> RepoResult<Option<Rider>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $rider SET availability = false \
                 WHERE availability = true RETURN AFTER",
            )
            .bind(("rider", id.clone()))
            .await?;
        let riders: Vec<Rider> = result.take(0)?;
        Ok(riders.into_iter().next())
    }

    /// Mark a rider free again after a terminal delivery
    pub async fn free(&self, id: &RecordId, delivery: &RecordId) -> RepoResult<Rider> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $rider SET \
                 availability = true, \
                 assigned_deliveries -= $delivery \
                 RETURN AFTER",
            )
            .bind(("rider", id.clone()))
            .bind(("delivery", delivery.to_string()))
            .await?;
        let riders: Vec<Rider> = result.take(0)?;
        riders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Rider not found: {}", id)))
    }

    /// Position report from the rider app
    pub async fn set_location(
        &self,
        id: &RecordId,
        location: crate::db::models::GeoPoint,
    ) -> RepoResult<Rider> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $rider SET location = $location RETURN AFTER")
            .bind(("rider", id.clone()))
            .bind(("location", location))
            .await?;
        let riders: Vec<Rider> = result.take(0)?;
        riders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Rider not found: {}", id)))
    }

    /// Manual availability toggle from the rider app
    pub async fn set_availability(&self, id: &RecordId, available: bool) -> RepoResult<Rider> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $rider SET availability = $available RETURN AFTER")
            .bind(("rider", id.clone()))
            .bind(("available", available))
            .await?;
        let riders: Vec<Rider> = result.take(0)?;
        riders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Rider not found: {}", id)))
    }
}
