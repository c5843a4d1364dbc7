//! Google Calendar integration for table reservations

use super::{CalendarSync, ReservationEvent, ServiceError, ServiceResult};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: reqwest::Client,
    calendar_id: String,
    api_token: String,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: String, api_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            calendar_id,
            api_token,
        }
    }

    fn to_rfc3339(millis: i64) -> String {
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
            .to_rfc3339()
    }
}

#[async_trait]
impl CalendarSync for GoogleCalendarClient {
    async fn create_event(&self, event: &ReservationEvent) -> ServiceResult<String> {
        let url = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            self.calendar_id
        );
        let body = serde_json::json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": Self::to_rfc3339(event.start_at) },
            "end": { "dateTime": Self::to_rfc3339(event.end_at) },
        });
        let resp: serde_json::Value = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        resp["id"].as_str().map(String::from).ok_or_else(|| {
            ServiceError::BadResponse(format!("Calendar event creation failed: {resp}"))
        })
    }
}
