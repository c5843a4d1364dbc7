//! Dining Table API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/tables | GET | 获取所有桌台 |
//! | /api/tables | POST | 创建桌台 |
//! | /api/tables/reserve | POST | 预订桌台 (CAS) |
//! | /api/tables/{id}/release | POST | 释放桌台 |
//! | /api/tables/sweep | POST | 强制释放过期占用 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/reserve", post(handler::reserve))
        .route("/{id}/release", post(handler::release))
        .route("/sweep", post(handler::sweep))
}
