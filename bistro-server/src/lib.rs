//! Bistro Server - 餐厅运营后端
//!
//! # 架构概述
//!
//! 本模块是 Bistro Server 的主入口，提供以下核心功能：
//!
//! - **订单编排** (`orders`): 下单流水线 (校验、定价、支付、配送、积分)
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **餐台** (`tables`): 餐台占用与超时释放
//! - **配送** (`dispatch`): 骑手分配与配送状态机
//! - **会员** (`loyalty`): 积分账户与 VIP 等级
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! bistro-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (models + repositories)
//! ├── orders/        # 订单编排器
//! ├── pricing/       # 折扣与价格计算
//! ├── geo/           # 距离与配送报价
//! ├── tables/        # 餐台分配器
//! ├── dispatch/      # 骑手调度
//! ├── loyalty/       # 积分与 VIP
//! ├── services/      # 外部服务 (Stripe/Twilio/Maps/Calendar)
//! └── utils/         # 错误、日志、工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod dispatch;
pub mod geo;
pub mod loyalty;
pub mod orders;
pub mod pricing;
pub mod services;
pub mod tables;
pub mod utils;

#[cfg(test)]
pub mod testing;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use dispatch::RiderDispatch;
pub use geo::DeliveryEstimator;
pub use loyalty::LoyaltyService;
pub use orders::OrderOrchestrator;
pub use pricing::calculate_order_price;
pub use tables::TableAllocator;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    if config.is_production() {
        init_logger_with_file(None, log_dir.to_str());
    } else {
        init_logger();
    }

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  _      __
   / __ )(_)____/ /__________
  / __  / / ___/ __/ ___/ __ \
 / /_/ / (__  ) /_/ /  / /_/ /
/_____/_/____/\__/_/   \____/
    "#
    );
}
