//! Shared test fixtures: in-memory database, mock collaborators and a
//! fully wired orchestrator.

use crate::core::config::Policy;
use crate::db::DbService;
use crate::db::models::*;
use crate::db::repository::*;
use crate::dispatch::RiderDispatch;
use crate::geo::DeliveryEstimator;
use crate::loyalty::LoyaltyService;
use crate::orders::OrderOrchestrator;
use crate::services::*;
use crate::tables::TableAllocator;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use surrealdb::RecordId;
use tokio::sync::Mutex;

/// Payment gateway with a scriptable outcome
pub struct MockPayment {
    pub fail_with: Option<String>,
    pub delay: Option<std::time::Duration>,
    pub charges: AtomicUsize,
    pub refunds: AtomicUsize,
}

impl MockPayment {
    pub fn succeeding() -> Self {
        Self {
            fail_with: None,
            delay: None,
            charges: AtomicUsize::new(0),
            refunds: AtomicUsize::new(0),
        }
    }

    pub fn declining(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::succeeding()
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPayment {
    async fn charge(&self, _amount: f64, order_ref: &str) -> ServiceResult<ChargeOutcome> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.charges.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(reason) => Ok(ChargeOutcome {
                success: false,
                transaction_id: None,
                decline_reason: Some(reason.clone()),
            }),
            None => Ok(ChargeOutcome {
                success: true,
                transaction_id: Some(format!("txn_{order_ref}")),
                decline_reason: None,
            }),
        }
    }

    async fn refund(&self, _transaction_id: &str) -> ServiceResult<()> {
        self.refunds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every message; optionally fails
pub struct MockSms {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl MockSms {
    pub fn new() -> Self {
        Self {
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SmsSender for MockSms {
    async fn send(&self, to: &str, body: &str) -> ServiceResult<()> {
        if self.fail {
            return Err(ServiceError::Request("sms gateway down".into()));
        }
        self.sent.lock().await.push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Fixed road distance
pub struct MockDistance(pub f64);

#[async_trait]
impl DistanceProvider for MockDistance {
    async fn distance(&self, _origin: &str, _dest: &str) -> ServiceResult<DistanceReading> {
        Ok(DistanceReading {
            distance_km: self.0,
            duration_minutes: (self.0 * 3.0).ceil() as i64,
        })
    }
}

/// Counts created events; optionally fails
pub struct MockCalendar {
    pub fail: bool,
    pub events: AtomicUsize,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self {
            fail: false,
            events: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CalendarSync for MockCalendar {
    async fn create_event(&self, _event: &ReservationEvent) -> ServiceResult<String> {
        if self.fail {
            return Err(ServiceError::Request("calendar down".into()));
        }
        let n = self.events.fetch_add(1, Ordering::SeqCst);
        Ok(format!("event-{n}"))
    }
}

/// Everything a pipeline test needs, wired over one in-memory database
pub struct Fixture {
    pub db: DbService,
    pub orders: OrderRepository,
    pub users: UserRepository,
    pub menu: MenuItemRepository,
    pub tables: DiningTableRepository,
    pub riders: RiderRepository,
    pub payment: Arc<MockPayment>,
    pub sms: Arc<MockSms>,
    pub calendar: Arc<MockCalendar>,
    pub orchestrator: OrderOrchestrator,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_parts(MockPayment::succeeding(), MockSms::new(), 5.0).await
    }

    pub async fn with_parts(payment: MockPayment, sms: MockSms, distance_km: f64) -> Self {
        let policy = Policy::default();
        let db = DbService::open_memory().await.unwrap();
        let orders = OrderRepository::new(db.db.clone());
        let users = UserRepository::new(db.db.clone());
        let menu = MenuItemRepository::new(db.db.clone());
        let tables = DiningTableRepository::new(db.db.clone());
        let riders = RiderRepository::new(db.db.clone());
        let deliveries = DeliveryRepository::new(db.db.clone());
        let loyalty_repo = LoyaltyRepository::new(db.db.clone());

        let payment = Arc::new(payment);
        let sms = Arc::new(sms);
        let calendar = Arc::new(MockCalendar::new());

        let allocator = TableAllocator::new(tables.clone(), policy.clone());
        let estimator = DeliveryEstimator::new(
            Arc::new(MockDistance(distance_km)),
            "1 Bistro Lane".into(),
            policy.clone(),
        );
        let dispatch = RiderDispatch::new(
            riders.clone(),
            deliveries,
            sms.clone(),
            GeoPoint { lat: 0.0, lng: 0.0 },
        );
        let loyalty = LoyaltyService::new(users.clone(), loyalty_repo, policy.clone());

        let orchestrator = OrderOrchestrator::new(
            orders.clone(),
            users.clone(),
            menu.clone(),
            allocator,
            estimator,
            dispatch,
            loyalty,
            payment.clone(),
            sms.clone(),
            calendar.clone(),
            policy,
        );

        Self {
            db,
            orders,
            users,
            menu,
            tables,
            riders,
            payment,
            sms,
            calendar,
            orchestrator,
        }
    }

    pub async fn add_user(&self, tier: Option<VipTier>) -> RecordId {
        let user = self
            .users
            .create(User {
                id: None,
                name: "Ama".into(),
                email: "ama@example.com".into(),
                phone: "+233200000001".into(),
                role: None,
                loyalty_points: 0,
                total_spent: 0.0,
                order_count: 0,
                is_vip: tier.is_some(),
                vip_tier: tier,
                vip_since: tier.map(|_| 0),
                vip_expires_at: None,
            })
            .await
            .unwrap();
        user.id.unwrap()
    }

    pub async fn add_menu_item(
        &self,
        name: &str,
        price: f64,
        category: &str,
        prep: i64,
    ) -> RecordId {
        let item = self
            .menu
            .create(MenuItem {
                id: None,
                name: name.into(),
                description: None,
                price,
                category: category.into(),
                is_available: true,
                preparation_minutes: prep,
            })
            .await
            .unwrap();
        item.id.unwrap()
    }

    pub async fn add_table(&self, number: i64, table_type: TableType, capacity: i64) -> RecordId {
        let table = self
            .tables
            .create(DiningTableCreate {
                table_number: number,
                table_type,
                capacity,
                location: TableLocation::Indoor,
            })
            .await
            .unwrap();
        table.id.unwrap()
    }

    pub async fn add_rider(&self, name: &str, lat: f64) -> RecordId {
        let rider = self
            .riders
            .create(Rider {
                id: None,
                name: name.into(),
                phone: "+233200000099".into(),
                vehicle: "bike".into(),
                availability: true,
                location: Some(GeoPoint { lat, lng: 0.0 }),
                assigned_deliveries: vec![],
            })
            .await
            .unwrap();
        rider.id.unwrap()
    }
}
