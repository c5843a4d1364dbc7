//! Delivery Estimator
//!
//! Turns a road-distance reading into a radius check and a delivery fee.
//! Radius and fee depend on the customer's effective tier:
//! - non-VIP: standard radius, full fee
//! - gold: extended radius, half fee
//! - platinum: extended radius, fee waived

use crate::core::config::Policy;
use crate::db::models::VipTier;
use crate::pricing::money::{to_decimal, to_f64};
use crate::services::{DistanceProvider, ServiceError};
use crate::utils::AppError;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Outcome of a successful delivery estimate
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryQuote {
    pub distance_km: f64,
    pub fee: f64,
    pub eta_minutes: i64,
}

#[derive(Clone)]
pub struct DeliveryEstimator {
    provider: Arc<dyn DistanceProvider>,
    origin: String,
    policy: Policy,
}

impl DeliveryEstimator {
    pub fn new(provider: Arc<dyn DistanceProvider>, origin: String, policy: Policy) -> Self {
        Self {
            provider,
            origin,
            policy,
        }
    }

    fn radius_for(&self, tier: Option<VipTier>) -> f64 {
        if tier.is_some() {
            self.policy.vip_radius_km
        } else {
            self.policy.standard_radius_km
        }
    }

    /// Fee after the tier benefit, from an already-validated distance
    pub fn fee_for(&self, distance_km: f64, tier: Option<VipTier>) -> f64 {
        let base = to_decimal(distance_km) * to_decimal(self.policy.fee_per_km);
        let fee = match tier {
            Some(VipTier::Platinum) => Decimal::ZERO,
            Some(VipTier::Gold) => base / Decimal::TWO,
            _ => base,
        };
        to_f64(fee)
    }

    /// Quote a delivery for `destination`, enforcing the service radius.
    ///
    /// A provider failure maps to `DistanceUnavailable` so the caller can
    /// tell "too far" from "could not measure".
    pub async fn estimate(
        &self,
        destination: &str,
        tier: Option<VipTier>,
    ) -> Result<DeliveryQuote, AppError> {
        let reading = self
            .provider
            .distance(&self.origin, destination)
            .await
            .map_err(|e: ServiceError| {
                tracing::warn!(error = %e, "Distance lookup failed");
                AppError::distance_unavailable(e.to_string())
            })?;

        let radius = self.radius_for(tier);
        if reading.distance_km > radius {
            return Err(AppError::out_of_service_area(format!(
                "Address is {:.1} km away; delivery radius is {:.0} km",
                reading.distance_km, radius
            )));
        }

        Ok(DeliveryQuote {
            distance_km: reading.distance_km,
            fee: self.fee_for(reading.distance_km, tier),
            eta_minutes: reading.duration_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DistanceReading, ServiceResult};
    use async_trait::async_trait;

    struct FixedDistance(f64);

    #[async_trait]
    impl DistanceProvider for FixedDistance {
        async fn distance(&self, _origin: &str, _dest: &str) -> ServiceResult<DistanceReading> {
            Ok(DistanceReading {
                distance_km: self.0,
                duration_minutes: (self.0 * 3.0) as i64,
            })
        }
    }

    struct FailingDistance;

    #[async_trait]
    impl DistanceProvider for FailingDistance {
        async fn distance(&self, _origin: &str, _dest: &str) -> ServiceResult<DistanceReading> {
            Err(ServiceError::Request("timeout".into()))
        }
    }

    fn estimator(km: f64) -> DeliveryEstimator {
        DeliveryEstimator::new(
            Arc::new(FixedDistance(km)),
            "1 Bistro Lane".into(),
            Policy::default(),
        )
    }

    #[tokio::test]
    async fn standard_customer_pays_per_km() {
        let quote = estimator(8.0).estimate("12 Oak St", None).await.unwrap();
        assert_eq!(quote.fee, 12.0);
        assert_eq!(quote.distance_km, 8.0);
    }

    #[tokio::test]
    async fn twelve_km_is_outside_standard_radius() {
        let err = estimator(12.0).estimate("12 Oak St", None).await.unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::OutOfServiceArea);
    }

    #[tokio::test]
    async fn twelve_km_is_inside_vip_radius() {
        let quote = estimator(12.0)
            .estimate("12 Oak St", Some(VipTier::Gold))
            .await
            .unwrap();
        // Gold pays half of 12 × 1.5
        assert_eq!(quote.fee, 9.0);
    }

    #[tokio::test]
    async fn platinum_fee_is_waived() {
        let quote = estimator(9.0)
            .estimate("12 Oak St", Some(VipTier::Platinum))
            .await
            .unwrap();
        assert_eq!(quote.fee, 0.0);
    }

    #[tokio::test]
    async fn sixteen_km_is_outside_even_vip_radius() {
        let err = estimator(16.0)
            .estimate("12 Oak St", Some(VipTier::Platinum))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::OutOfServiceArea);
    }

    #[tokio::test]
    async fn provider_failure_maps_to_distance_unavailable() {
        let est = DeliveryEstimator::new(
            Arc::new(FailingDistance),
            "1 Bistro Lane".into(),
            Policy::default(),
        );
        let err = est.estimate("12 Oak St", None).await.unwrap_err();
        assert_eq!(err.code, crate::utils::ErrorCode::DistanceUnavailable);
    }
}
