//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, TableType};
use crate::db::repository::DiningTableRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct ReservePayload {
    pub user_id: String,
    pub table_type: TableType,
    #[validate(range(min = 1, max = 50, message = "Party size must be between 1 and 50"))]
    pub party_size: i64,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub table: DiningTable,
    pub reserved_at: i64,
    pub release_at: i64,
}

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_all().await?;
    Ok(Json(tables))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    if payload.capacity < 1 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(payload).await?;
    Ok(Json(table))
}

/// POST /api/tables/reserve - 预订桌台
pub async fn reserve(
    State(state): State<ServerState>,
    Json(payload): Json<ReservePayload>,
) -> AppResult<Json<ReserveResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user_id = parse_record("user", &payload.user_id)?;
    let hold = state
        .allocator
        .reserve(payload.table_type, payload.party_size, &user_id, None)
        .await?;
    Ok(Json(ReserveResponse {
        table: hold.table,
        reserved_at: hold.reserved_at,
        release_at: hold.release_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub released: usize,
}

/// POST /api/tables/sweep - 立即释放所有过期占用 (后台任务也会定期执行)
pub async fn sweep(State(state): State<ServerState>) -> AppResult<Json<SweepResponse>> {
    let released = state
        .allocator
        .sweep_expired(crate::utils::now_millis())
        .await?;
    Ok(Json(SweepResponse { released }))
}

/// POST /api/tables/:id/release - 释放桌台
pub async fn release(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let id = parse_record("dining_table", &id)?;
    let table = state.allocator.release(&id).await?;
    Ok(Json(table))
}
