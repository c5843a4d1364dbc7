//! Server Configuration
//!
//! All settings load from environment variables with sensible defaults;
//! business-rule knobs live in [`Policy`] so tests can override them
//! without touching the environment.

/// Server configuration
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/bistro | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | RESTAURANT_ADDRESS | (none) | 配送距离计算的起点地址 |
/// | STRIPE_SECRET_KEY | (none) | Stripe API key |
/// | TWILIO_ACCOUNT_SID | (none) | Twilio account SID |
/// | TWILIO_AUTH_TOKEN | (none) | Twilio auth token |
/// | TWILIO_FROM_NUMBER | (none) | SMS 发送号码 |
/// | MAPS_API_KEY | (none) | Google Maps Distance Matrix key |
/// | CALENDAR_ID | (none) | Google Calendar id for reservations |
/// | CALENDAR_API_TOKEN | (none) | Google Calendar OAuth bearer token |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 配送起点 (餐厅地址)
    pub restaurant_address: String,
    /// 餐厅坐标 (骑手派单距离计算)
    pub restaurant_lat: f64,
    pub restaurant_lng: f64,

    // === External collaborators ===
    pub stripe_secret_key: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
    pub maps_api_key: String,
    pub calendar_id: String,
    pub calendar_api_token: String,

    /// Business-rule knobs
    pub policy: Policy,
}

/// Business-rule parameters
///
/// Defaults match the house rules; every field can be overridden via
/// `POLICY_*` environment variables.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Percentage discount on the items subtotal per tier
    pub silver_discount_percent: f64,
    pub gold_discount_percent: f64,
    pub platinum_discount_percent: f64,

    /// Delivery radius in km for non-VIP / VIP customers
    pub standard_radius_km: f64,
    pub vip_radius_km: f64,
    /// Delivery fee per km
    pub fee_per_km: f64,

    /// Loyalty earn: floor(amount / earn_divisor) points, doubled for VIPs
    pub earn_divisor: f64,
    pub vip_earn_multiplier: i64,

    /// Lifetime-points thresholds for each tier
    pub silver_points: i64,
    pub gold_points: i64,
    pub platinum_points: i64,
    /// Additional qualification gates
    pub vip_min_orders: i64,
    pub vip_min_spend: f64,

    /// Table hold duration in minutes
    pub table_hold_minutes: i64,
    /// Sweep interval for expired holds, in seconds
    pub sweep_interval_secs: u64,

    /// Online payment timeout in seconds
    pub payment_timeout_secs: u64,

    /// Complimentary item rules
    pub platinum_bonus_category: String,
    pub gold_bonus_category: String,
    pub gold_bonus_price_cap: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            silver_discount_percent: 0.0,
            gold_discount_percent: 5.0,
            platinum_discount_percent: 10.0,
            standard_radius_km: 10.0,
            vip_radius_km: 15.0,
            fee_per_km: 1.5,
            earn_divisor: 10.0,
            vip_earn_multiplier: 2,
            silver_points: 1000,
            gold_points: 2500,
            platinum_points: 5000,
            vip_min_orders: 5,
            vip_min_spend: 500.0,
            table_hold_minutes: 120,
            sweep_interval_secs: 60,
            payment_timeout_secs: 15,
            platinum_bonus_category: "appetizers".into(),
            gold_bonus_category: "drinks".into(),
            gold_bonus_price_cap: 5.0,
        }
    }
}

impl Policy {
    /// Load policy overrides from `POLICY_*` environment variables
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(v) = env_parse("POLICY_SILVER_DISCOUNT_PERCENT") {
            policy.silver_discount_percent = v;
        }
        if let Some(v) = env_parse("POLICY_GOLD_DISCOUNT_PERCENT") {
            policy.gold_discount_percent = v;
        }
        if let Some(v) = env_parse("POLICY_PLATINUM_DISCOUNT_PERCENT") {
            policy.platinum_discount_percent = v;
        }
        if let Some(v) = env_parse("POLICY_STANDARD_RADIUS_KM") {
            policy.standard_radius_km = v;
        }
        if let Some(v) = env_parse("POLICY_VIP_RADIUS_KM") {
            policy.vip_radius_km = v;
        }
        if let Some(v) = env_parse("POLICY_FEE_PER_KM") {
            policy.fee_per_km = v;
        }
        if let Some(v) = env_parse("POLICY_EARN_DIVISOR") {
            policy.earn_divisor = v;
        }
        if let Some(v) = env_parse("POLICY_VIP_EARN_MULTIPLIER") {
            policy.vip_earn_multiplier = v;
        }
        if let Some(v) = env_parse("POLICY_SILVER_POINTS") {
            policy.silver_points = v;
        }
        if let Some(v) = env_parse("POLICY_GOLD_POINTS") {
            policy.gold_points = v;
        }
        if let Some(v) = env_parse("POLICY_PLATINUM_POINTS") {
            policy.platinum_points = v;
        }
        if let Some(v) = env_parse("POLICY_VIP_MIN_ORDERS") {
            policy.vip_min_orders = v;
        }
        if let Some(v) = env_parse("POLICY_VIP_MIN_SPEND") {
            policy.vip_min_spend = v;
        }
        if let Some(v) = env_parse("POLICY_TABLE_HOLD_MINUTES") {
            policy.table_hold_minutes = v;
        }
        if let Some(v) = env_parse("POLICY_SWEEP_INTERVAL_SECS") {
            policy.sweep_interval_secs = v;
        }
        if let Some(v) = env_parse("POLICY_PAYMENT_TIMEOUT_SECS") {
            policy.payment_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("POLICY_PLATINUM_BONUS_CATEGORY") {
            policy.platinum_bonus_category = v;
        }
        if let Ok(v) = std::env::var("POLICY_GOLD_BONUS_CATEGORY") {
            policy.gold_bonus_category = v;
        }
        if let Some(v) = env_parse("POLICY_GOLD_BONUS_PRICE_CAP") {
            policy.gold_bonus_price_cap = v;
        }
        policy
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/bistro".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            restaurant_address: std::env::var("RESTAURANT_ADDRESS").unwrap_or_default(),
            restaurant_lat: env_parse("RESTAURANT_LAT").unwrap_or(0.0),
            restaurant_lng: env_parse("RESTAURANT_LNG").unwrap_or(0.0),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            twilio_account_sid: std::env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_from_number: std::env::var("TWILIO_FROM_NUMBER").unwrap_or_default(),
            maps_api_key: std::env::var("MAPS_API_KEY").unwrap_or_default(),
            calendar_id: std::env::var("CALENDAR_ID").unwrap_or_default(),
            calendar_api_token: std::env::var("CALENDAR_API_TOKEN").unwrap_or_default(),
            policy: Policy::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置 (常用于测试场景)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("database")
    }

    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reads_every_override_group_from_env() {
        // set_var is unsafe since edition 2024; this test owns these keys
        unsafe {
            std::env::set_var("POLICY_SILVER_DISCOUNT_PERCENT", "2.5");
            std::env::set_var("POLICY_EARN_DIVISOR", "20");
            std::env::set_var("POLICY_VIP_MIN_ORDERS", "8");
            std::env::set_var("POLICY_GOLD_BONUS_CATEGORY", "desserts");
            std::env::set_var("POLICY_GOLD_BONUS_PRICE_CAP", "7.5");
        }

        let policy = Policy::from_env();
        assert_eq!(policy.silver_discount_percent, 2.5);
        assert_eq!(policy.earn_divisor, 20.0);
        assert_eq!(policy.vip_min_orders, 8);
        assert_eq!(policy.gold_bonus_category, "desserts");
        assert_eq!(policy.gold_bonus_price_cap, 7.5);
        // Untouched knobs keep their defaults
        assert_eq!(policy.platinum_discount_percent, 10.0);

        unsafe {
            std::env::remove_var("POLICY_SILVER_DISCOUNT_PERCENT");
            std::env::remove_var("POLICY_EARN_DIVISOR");
            std::env::remove_var("POLICY_VIP_MIN_ORDERS");
            std::env::remove_var("POLICY_GOLD_BONUS_CATEGORY");
            std::env::remove_var("POLICY_GOLD_BONUS_PRICE_CAP");
        }
    }
}
