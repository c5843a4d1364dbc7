//! Loyalty API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/loyalty/{user_id} | GET | 查询积分账户 |
//! | /api/loyalty/{user_id}/earn | POST | 手动累积积分 |
//! | /api/loyalty/{user_id}/redeem | POST | 兑换积分 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/loyalty", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{user_id}", get(handler::view))
        .route("/{user_id}/earn", post(handler::earn))
        .route("/{user_id}/redeem", post(handler::redeem))
}
