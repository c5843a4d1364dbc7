//! Server State
//!
//! Holds the shared handles every request needs: the embedded database,
//! the wired service layer and the business-rule policy. Cloning is cheap;
//! everything heavyweight sits behind an Arc.

use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::db::models::GeoPoint;
use crate::db::repository::{
    DeliveryRepository, DiningTableRepository, LoyaltyRepository, MenuItemRepository,
    OrderRepository, RiderRepository, UserRepository,
};
use crate::dispatch::RiderDispatch;
use crate::geo::DeliveryEstimator;
use crate::loyalty::LoyaltyService;
use crate::orders::OrderOrchestrator;
use crate::services::{
    CalendarSync, DistanceProvider, GoogleCalendarClient, GoogleMapsProvider, PaymentGateway,
    SmsSender, StripeGateway, TwilioSender,
};
use crate::tables::TableAllocator;

/// 服务器状态 - 持有所有服务的共享引用
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 订单编排器
    pub orchestrator: OrderOrchestrator,
    /// 桌台分配
    pub allocator: TableAllocator,
    /// 骑手派单
    pub dispatch: RiderDispatch,
    /// 积分/VIP 服务
    pub loyalty: LoyaltyService,
}

impl ServerState {
    /// Wire the full service graph over an open database and a set of
    /// collaborator implementations.
    pub fn from_parts(
        config: Config,
        db: Surreal<Db>,
        payment: Arc<dyn PaymentGateway>,
        sms: Arc<dyn SmsSender>,
        distance: Arc<dyn DistanceProvider>,
        calendar: Arc<dyn CalendarSync>,
    ) -> Self {
        let policy = config.policy.clone();

        let orders = OrderRepository::new(db.clone());
        let users = UserRepository::new(db.clone());
        let menu = MenuItemRepository::new(db.clone());
        let tables = DiningTableRepository::new(db.clone());
        let riders = RiderRepository::new(db.clone());
        let deliveries = DeliveryRepository::new(db.clone());
        let loyalty_repo = LoyaltyRepository::new(db.clone());

        let allocator = TableAllocator::new(tables, policy.clone());
        let estimator = DeliveryEstimator::new(
            distance,
            config.restaurant_address.clone(),
            policy.clone(),
        );
        let dispatch = RiderDispatch::new(
            riders,
            deliveries,
            sms.clone(),
            GeoPoint {
                lat: config.restaurant_lat,
                lng: config.restaurant_lng,
            },
        );
        let loyalty = LoyaltyService::new(users.clone(), loyalty_repo, policy.clone());

        let orchestrator = OrderOrchestrator::new(
            orders,
            users,
            menu,
            allocator.clone(),
            estimator,
            dispatch.clone(),
            loyalty.clone(),
            payment,
            sms,
            calendar,
            policy,
        );

        Self {
            config,
            db,
            orchestrator,
            allocator,
            dispatch,
            loyalty,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 打开数据库 (work_dir/database)
    /// 3. 构建外部协作方客户端并接线服务层
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        std::fs::create_dir_all(PathBuf::from(&config.work_dir))
            .expect("Failed to create work directory");

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let payment: Arc<dyn PaymentGateway> =
            Arc::new(StripeGateway::new(config.stripe_secret_key.clone()));
        let sms: Arc<dyn SmsSender> = Arc::new(TwilioSender::new(
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
            config.twilio_from_number.clone(),
        ));
        let distance: Arc<dyn DistanceProvider> =
            Arc::new(GoogleMapsProvider::new(config.maps_api_key.clone()));
        let calendar: Arc<dyn CalendarSync> = Arc::new(GoogleCalendarClient::new(
            config.calendar_id.clone(),
            config.calendar_api_token.clone(),
        ));

        Self::from_parts(config.clone(), db_service.db, payment, sms, distance, calendar)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
