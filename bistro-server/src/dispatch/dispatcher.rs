//! Rider Dispatcher
//!
//! Candidates are ranked by straight-line distance from the rider's last
//! known position to the restaurant pickup point, ties broken by record id.
//! The winner is claimed with a compare-and-set; losing a claim race moves
//! on to the next-nearest candidate instead of failing the dispatch.

use crate::db::models::{Delivery, DeliveryStatus, GeoPoint, Rider};
use crate::db::repository::{DeliveryRepository, RiderRepository};
use crate::geo::haversine_km;
use crate::services::{SmsSender, notification::templates};
use crate::utils::{self, AppError, ErrorCode};
use std::sync::Arc;
use surrealdb::RecordId;

#[derive(Clone)]
pub struct RiderDispatch {
    riders: RiderRepository,
    deliveries: DeliveryRepository,
    sms: Arc<dyn SmsSender>,
    pickup_point: GeoPoint,
}

impl RiderDispatch {
    pub fn new(
        riders: RiderRepository,
        deliveries: DeliveryRepository,
        sms: Arc<dyn SmsSender>,
        pickup_point: GeoPoint,
    ) -> Self {
        Self {
            riders,
            deliveries,
            sms,
            pickup_point,
        }
    }

    /// Rank available riders nearest-first; riders without a known location
    /// sort last so they are only used when no positioned rider is free.
    fn rank(&self, mut riders: Vec<Rider>) -> Vec<Rider> {
        riders.sort_by(|a, b| {
            let da = a.location.map(|l| haversine_km(l, self.pickup_point));
            let db = b.location.map(|l| haversine_km(l, self.pickup_point));
            match (da, db) {
                (Some(x), Some(y)) => x
                    .partial_cmp(&y)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| id_key(a).cmp(&id_key(b))),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => id_key(a).cmp(&id_key(b)),
            }
        });
        riders
    }

    /// Assign the nearest free rider to `order_id` and create the delivery.
    pub async fn assign(
        &self,
        order_id: &RecordId,
        address: &str,
        eta_minutes: Option<i64>,
    ) -> Result<Delivery, AppError> {
        let candidates = self.rank(self.riders.find_available().await?);
        if candidates.is_empty() {
            return Err(AppError::new(ErrorCode::NoRidersAvailable));
        }

        for candidate in candidates {
            let Some(rider_id) = candidate.id.clone() else {
                continue;
            };
            // Lost the claim race: fall through to the next-nearest rider
            let Some(rider) = self.riders.claim(&rider_id).await? else {
                continue;
            };

            let delivery_id =
                RecordId::from_table_key("delivery", uuid::Uuid::new_v4().to_string());
            let delivery = Delivery {
                id: None,
                order_id: order_id.clone(),
                rider_id: rider_id.clone(),
                status: DeliveryStatus::Pending,
                location: None,
                eta_minutes,
                notes: None,
                created_at: utils::now_millis(),
            };
            // Delivery insert and rider link commit as one transaction;
            // a failure hands the claim back before surfacing the error
            let created = match self
                .deliveries
                .create_assigned(&delivery_id, delivery, &rider_id)
                .await
            {
                Ok(created) => created,
                Err(e) => {
                    if let Err(free_err) = self.riders.set_availability(&rider_id, true).await {
                        tracing::error!(
                            rider = %rider_id,
                            error = %free_err,
                            "Failed to release claimed rider"
                        );
                    }
                    return Err(e.into());
                }
            };

            tracing::info!(
                rider = %rider_id,
                order_id = %order_id,
                delivery = %delivery_id,
                "Rider assigned"
            );

            // Notification failure never unwinds the assignment
            let body = templates::delivery_assigned(&order_id.to_string(), address);
            if let Err(e) = self.sms.send(&rider.phone, &body).await {
                tracing::warn!(rider = %rider_id, error = %e, "Rider SMS failed");
            }

            return Ok(created);
        }

        Err(AppError::new(ErrorCode::NoRidersAvailable))
    }

    /// Move a delivery through its lifecycle; a terminal status frees the
    /// assigned rider.
    pub async fn update_status(
        &self,
        delivery_id: &RecordId,
        status: DeliveryStatus,
        location: Option<String>,
        notes: Option<String>,
    ) -> Result<Delivery, AppError> {
        let current = self.deliveries.find_by_id(delivery_id).await.map_err(|_| {
            AppError::new(ErrorCode::DeliveryNotFound)
        })?;
        if current.status.is_terminal() {
            return Err(AppError::with_message(
                ErrorCode::OrderStatusConflict,
                "Delivery already finished",
            ));
        }

        let updated = self
            .deliveries
            .update_status(delivery_id, status, location, notes)
            .await?;

        if status.is_terminal() {
            self.riders.free(&updated.rider_id, delivery_id).await?;
            tracing::info!(rider = %updated.rider_id, delivery = %delivery_id, "Rider freed");
        }

        Ok(updated)
    }
}

fn id_key(rider: &Rider) -> String {
    rider.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::services::ServiceResult;
    use async_trait::async_trait;

    struct NullSms;

    #[async_trait]
    impl SmsSender for NullSms {
        async fn send(&self, _to: &str, _body: &str) -> ServiceResult<()> {
            Ok(())
        }
    }

    async fn setup(rider_lats: &[f64]) -> (RiderDispatch, RiderRepository) {
        let db = DbService::open_memory().await.unwrap();
        let riders = RiderRepository::new(db.db.clone());
        let deliveries = DeliveryRepository::new(db.db.clone());
        for (n, lat) in rider_lats.iter().enumerate() {
            riders
                .create(Rider {
                    id: None,
                    name: format!("rider-{n}"),
                    phone: format!("+23320000000{n}"),
                    vehicle: "bike".into(),
                    availability: true,
                    location: Some(GeoPoint { lat: *lat, lng: 0.0 }),
                    assigned_deliveries: vec![],
                })
                .await
                .unwrap();
        }
        let dispatch = RiderDispatch::new(
            riders.clone(),
            deliveries,
            Arc::new(NullSms),
            GeoPoint { lat: 0.0, lng: 0.0 },
        );
        (dispatch, riders)
    }

    fn order_id() -> RecordId {
        "orders:o1".parse().unwrap()
    }

    #[tokio::test]
    async fn assigns_nearest_rider() {
        // Latitude offsets put riders at roughly 356, 122 and 556 km
        let (dispatch, riders) = setup(&[3.2, 1.1, 5.0]).await;

        let delivery = dispatch
            .assign(&order_id(), "12 Oak St", Some(20))
            .await
            .unwrap();

        let rider = riders.find_by_id(&delivery.rider_id).await.unwrap();
        assert_eq!(rider.name, "rider-1");
        assert!(!rider.availability);
        assert_eq!(rider.assigned_deliveries.len(), 1);
        assert_eq!(delivery.status, DeliveryStatus::Pending);
    }

    #[tokio::test]
    async fn no_riders_is_an_error() {
        let (dispatch, _) = setup(&[]).await;
        let err = dispatch
            .assign(&order_id(), "12 Oak St", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRidersAvailable);
    }

    #[tokio::test]
    async fn busy_riders_are_skipped() {
        let (dispatch, riders) = setup(&[1.0, 2.0]).await;
        // Claim the nearest rider out of band
        let all = riders.find_available().await.unwrap();
        let nearest = all
            .iter()
            .find(|r| r.name == "rider-0")
            .and_then(|r| r.id.clone())
            .unwrap();
        riders.claim(&nearest).await.unwrap();

        let delivery = dispatch.assign(&order_id(), "12 Oak St", None).await.unwrap();
        let assigned = riders.find_by_id(&delivery.rider_id).await.unwrap();
        assert_eq!(assigned.name, "rider-1");
    }

    #[tokio::test]
    async fn failed_delivery_insert_leaves_no_half_assignment() {
        let (dispatch, riders) = setup(&[1.0]).await;
        let delivery = dispatch.assign(&order_id(), "12 Oak St", None).await.unwrap();
        let delivery_id = delivery.id.clone().unwrap();

        // Re-inserting under an existing id fails as one unit: the rider's
        // delivery list keeps exactly the first assignment
        let dup = Delivery {
            id: None,
            order_id: "orders:o2".parse().unwrap(),
            rider_id: delivery.rider_id.clone(),
            status: DeliveryStatus::Pending,
            location: None,
            eta_minutes: None,
            notes: None,
            created_at: 0,
        };
        let result = dispatch
            .deliveries
            .create_assigned(&delivery_id, dup, &delivery.rider_id)
            .await;
        assert!(result.is_err());

        let rider = riders.find_by_id(&delivery.rider_id).await.unwrap();
        assert_eq!(rider.assigned_deliveries.len(), 1);
    }

    #[tokio::test]
    async fn terminal_status_frees_the_rider() {
        let (dispatch, riders) = setup(&[1.0]).await;
        let delivery = dispatch.assign(&order_id(), "12 Oak St", None).await.unwrap();
        let delivery_id = delivery.id.clone().unwrap();

        dispatch
            .update_status(&delivery_id, DeliveryStatus::InTransit, None, None)
            .await
            .unwrap();
        let rider = riders.find_by_id(&delivery.rider_id).await.unwrap();
        assert!(!rider.availability);

        dispatch
            .update_status(&delivery_id, DeliveryStatus::Delivered, None, None)
            .await
            .unwrap();
        let rider = riders.find_by_id(&delivery.rider_id).await.unwrap();
        assert!(rider.availability);
        assert!(rider.assigned_deliveries.is_empty());

        // Further updates are rejected
        let err = dispatch
            .update_status(&delivery_id, DeliveryStatus::Failed, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderStatusConflict);
    }
}
