//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 创建订单 (完整编排流程) |
//! | /api/orders/{id} | GET | 查询订单 |
//! | /api/orders/user/{user_id} | GET | 查询用户订单 |
//! | /api/orders/{id}/cancel | POST | 取消订单 (含退款) |
//! | /api/orders/{id}/status | PUT | 推进订单状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/user/{user_id}", get(handler::list_for_user))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", put(handler::update_status))
}
