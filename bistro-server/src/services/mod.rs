//! 服务层 - 外部协作方
//!
//! # 服务列表
//!
//! - [`PaymentGateway`] / [`StripeGateway`] - 在线支付 (Stripe REST API)
//! - [`SmsSender`] / [`TwilioSender`] - 订单通知短信 (Twilio)
//! - [`DistanceProvider`] / [`GoogleMapsProvider`] - 配送距离 (Distance Matrix)
//! - [`CalendarSync`] / [`GoogleCalendarClient`] - 预订日历事件
//!
//! Every collaborator sits behind a trait so the order pipeline can be
//! exercised against in-process fakes.

pub mod calendar;
pub mod maps;
pub mod notification;
pub mod payment;

pub use calendar::GoogleCalendarClient;
pub use maps::GoogleMapsProvider;
pub use notification::TwilioSender;
pub use payment::StripeGateway;

use async_trait::async_trait;
use thiserror::Error;

/// External service error
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    BadResponse(String),

    #[error("Declined: {0}")]
    Declined(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Request(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a charge attempt that reached the processor
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub decline_reason: Option<String>,
}

/// Distance reading between the restaurant and a delivery address
#[derive(Debug, Clone, Copy)]
pub struct DistanceReading {
    pub distance_km: f64,
    pub duration_minutes: i64,
}

/// Reservation event pushed to the shared calendar
#[derive(Debug, Clone)]
pub struct ReservationEvent {
    pub summary: String,
    pub description: String,
    /// Epoch millis
    pub start_at: i64,
    /// Epoch millis
    pub end_at: i64,
}

/// Online payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` (major currency units) for an order
    async fn charge(&self, amount: f64, order_ref: &str) -> ServiceResult<ChargeOutcome>;

    /// Refund a previously captured charge
    async fn refund(&self, transaction_id: &str) -> ServiceResult<()>;
}

/// Road-distance lookup from the restaurant to a customer address
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance(&self, origin: &str, destination: &str) -> ServiceResult<DistanceReading>;
}

/// SMS notifications
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> ServiceResult<()>;
}

/// Reservation calendar
#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn create_event(&self, event: &ReservationEvent) -> ServiceResult<String>;
}
