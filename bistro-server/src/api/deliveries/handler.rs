//! Delivery API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{Delivery, DeliveryStatus};
use crate::db::repository::DeliveryRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct DeliveryStatusPayload {
    pub status: DeliveryStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignPayload {
    pub order_id: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub eta_minutes: Option<i64>,
}

/// POST /api/deliveries/assign - 为订单手动派单
///
/// 下单流水线会自动派单；这个端点用于补派 (如当时无可用骑手)。
pub async fn assign(
    State(state): State<ServerState>,
    Json(payload): Json<AssignPayload>,
) -> AppResult<Json<Delivery>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let order_id = parse_record("orders", &payload.order_id)?;
    let delivery = state
        .dispatch
        .assign(&order_id, &payload.address, payload.eta_minutes)
        .await?;
    Ok(Json(delivery))
}

/// GET /api/deliveries/:id - 查询配送
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Delivery>> {
    let repo = DeliveryRepository::new(state.db.clone());
    let id = parse_record("delivery", &id)?;
    let delivery = repo.find_by_id(&id).await?;
    Ok(Json(delivery))
}

/// PUT /api/deliveries/:id/status - 更新配送状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DeliveryStatusPayload>,
) -> AppResult<Json<Delivery>> {
    let id = parse_record("delivery", &id)?;
    let delivery = state
        .dispatch
        .update_status(&id, payload.status, payload.location, payload.notes)
        .await?;
    Ok(Json(delivery))
}
