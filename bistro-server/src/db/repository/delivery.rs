//! Delivery Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Delivery, DeliveryStatus};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct DeliveryRepository {
    base: BaseRepository,
}

impl DeliveryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a delivery under a caller-chosen record id and link it onto
    /// the claimed rider in one transaction; a failed insert leaves the
    /// rider's delivery list untouched.
    pub async fn create_assigned(
        &self,
        id: &RecordId,
        delivery: Delivery,
        rider_id: &RecordId,
    ) -> RepoResult<Delivery> {
        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION; \
                 CREATE $delivery CONTENT $content; \
                 UPDATE $rider SET assigned_deliveries += $delivery_key; \
                 COMMIT TRANSACTION;",
            )
            .bind(("delivery", id.clone()))
            .bind(("content", delivery))
            .bind(("rider", rider_id.clone()))
            .bind(("delivery_key", id.to_string()))
            .await?;
        let created: Vec<Delivery> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create delivery".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Delivery> {
        let delivery: Option<Delivery> = self.base.db().select(id.clone()).await?;
        delivery.ok_or_else(|| RepoError::NotFound(format!("Delivery not found: {}", id)))
    }

    pub async fn find_by_order(&self, order_id: &RecordId) -> RepoResult<Option<Delivery>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM delivery WHERE order_id = $order_id LIMIT 1")
            .bind(("order_id", order_id.to_string()))
            .await?;
        let deliveries: Vec<Delivery> = result.take(0)?;
        Ok(deliveries.into_iter().next())
    }

    pub async fn update_status(
        &self,
        id: &RecordId,
        status: DeliveryStatus,
        location: Option<String>,
        notes: Option<String>,
    ) -> RepoResult<Delivery> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $delivery SET \
                 status = $status, \
                 location = $location ?? location, \
                 notes = $notes ?? notes \
                 RETURN AFTER",
            )
            .bind(("delivery", id.clone()))
            .bind(("status", status))
            .bind(("location", location))
            .bind(("notes", notes))
            .await?;
        let deliveries: Vec<Delivery> = result.take(0)?;
        deliveries
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Delivery not found: {}", id)))
    }
}
