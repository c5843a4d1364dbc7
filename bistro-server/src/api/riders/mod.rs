//! Rider API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/riders | GET | 获取空闲骑手 |
//! | /api/riders | POST | 注册骑手 |
//! | /api/riders/{id}/availability | PUT | 上下线切换 |
//! | /api/riders/{id}/location | PUT | 上报位置 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/riders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_available).post(handler::create))
        .route("/{id}/availability", put(handler::set_availability))
        .route("/{id}/location", put(handler::set_location))
}
