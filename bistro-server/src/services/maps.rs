//! Google Maps Distance Matrix integration

use super::{DistanceProvider, DistanceReading, ServiceError, ServiceResult};
use async_trait::async_trait;

#[derive(Clone)]
pub struct GoogleMapsProvider {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleMapsProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl DistanceProvider for GoogleMapsProvider {
    async fn distance(&self, origin: &str, destination: &str) -> ServiceResult<DistanceReading> {
        let resp: serde_json::Value = self
            .client
            .get("https://maps.googleapis.com/maps/api/distancematrix/json")
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("mode", "driving"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let element = &resp["rows"][0]["elements"][0];
        if element["status"].as_str() != Some("OK") {
            return Err(ServiceError::BadResponse(format!(
                "Distance Matrix returned no route: {}",
                element["status"]
            )));
        }

        let meters = element["distance"]["value"].as_f64().ok_or_else(|| {
            ServiceError::BadResponse("Distance Matrix response missing distance".into())
        })?;
        let seconds = element["duration"]["value"].as_f64().ok_or_else(|| {
            ServiceError::BadResponse("Distance Matrix response missing duration".into())
        })?;

        Ok(DistanceReading {
            distance_km: meters / 1000.0,
            duration_minutes: (seconds / 60.0).ceil() as i64,
        })
    }
}
