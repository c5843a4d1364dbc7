//! Delivery API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/deliveries/assign | POST | 手动派单 (最近骑手) |
//! | /api/deliveries/{id} | GET | 查询配送 |
//! | /api/deliveries/{id}/status | PUT | 更新配送状态 (终态释放骑手) |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/deliveries", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/assign", post(handler::assign))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}
