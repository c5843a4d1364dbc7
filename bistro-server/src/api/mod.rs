//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menu`] - 菜单查询
//! - [`orders`] - 订单生命周期 (创建/取消/状态)
//! - [`tables`] - 桌台预订
//! - [`deliveries`] - 配送跟踪
//! - [`riders`] - 骑手管理
//! - [`loyalty`] - 积分查询与兑换
//! - [`vip`] - VIP 会员管理 (admin)

pub mod deliveries;
pub mod health;
pub mod loyalty;
pub mod menu;
pub mod orders;
pub mod riders;
pub mod tables;
pub mod vip;

use crate::core::ServerState;
use crate::utils::AppError;
use axum::Router;
use surrealdb::RecordId;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a router with all routes registered (no middleware)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(deliveries::router())
        .merge(riders::router())
        .merge(loyalty::router())
        .merge(vip::router())
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse a path id that may be either a bare key ("abc") or a full
/// record id ("orders:abc")
pub(crate) fn parse_record(table: &str, raw: &str) -> Result<RecordId, AppError> {
    let parsed = if raw.contains(':') {
        raw.parse::<RecordId>().ok().filter(|id| id.table() == table)
    } else {
        Some(RecordId::from_table_key(table, raw))
    };
    parsed.ok_or_else(|| AppError::validation(format!("Invalid {table} id: {raw}")))
}
