//! Loyalty API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use serde::Serialize;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{LoyaltyRecord, User};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct RedeemPayload {
    #[validate(range(min = 1, message = "Points must be positive"))]
    pub points: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EarnPayload {
    pub order_id: String,
    #[validate(range(min = 0.01, message = "Amount must be positive"))]
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct EarnResponse {
    pub user: User,
    pub points_awarded: i64,
}

/// GET /api/loyalty/:user_id - 查询积分账户
pub async fn view(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<LoyaltyRecord>> {
    let user_id = parse_record("user", &user_id)?;
    let record = state.loyalty.view(&user_id).await?;
    Ok(Json(record))
}

/// POST /api/loyalty/:user_id/earn - 手动累积积分 (管理端补录)
///
/// 下单流水线自动累积；这个端点用于补录线下消费。
pub async fn earn(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<EarnPayload>,
) -> AppResult<Json<EarnResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user_id = parse_record("user", &user_id)?;
    let order_id = parse_record("orders", &payload.order_id)?;
    let (user, points_awarded) = state
        .loyalty
        .accrue(&user_id, &order_id, payload.amount)
        .await?;
    Ok(Json(EarnResponse {
        user,
        points_awarded,
    }))
}

/// POST /api/loyalty/:user_id/redeem - 兑换积分
pub async fn redeem(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<RedeemPayload>,
) -> AppResult<Json<LoyaltyRecord>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user_id = parse_record("user", &user_id)?;
    let record = state
        .loyalty
        .redeem(&user_id, payload.points, payload.description)
        .await?;
    Ok(Json(record))
}
