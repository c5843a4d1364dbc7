//! VIP API 模块 (管理端)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/vip/{user_id}/evaluate | POST | 重新评估资格 (仅升级) |
//! | /api/vip/{user_id}/grant | POST | 手动授予等级 |
//! | /api/vip/{user_id}/revoke | POST | 撤销会员 |
//! | /api/vip/{user_id}/extend | POST | 延长有效期 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/vip", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{user_id}/evaluate", post(handler::evaluate))
        .route("/{user_id}/grant", post(handler::grant))
        .route("/{user_id}/revoke", post(handler::revoke))
        .route("/{user_id}/extend", post(handler::extend))
}
