//! VIP API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{User, VipTier};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct GrantPayload {
    pub tier: VipTier,
    /// Defaults to the standard one-year term
    #[validate(range(min = 1, max = 3650))]
    pub term_days: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExtendPayload {
    #[validate(range(min = 1, max = 3650))]
    pub days: i64,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub upgraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<VipTier>,
}

/// POST /api/vip/:user_id/evaluate - 按消费历史重新评估资格
pub async fn evaluate(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<EvaluateResponse>> {
    let user_id = parse_record("user", &user_id)?;
    let tier = state.loyalty.evaluate_qualification(&user_id).await?;
    Ok(Json(EvaluateResponse {
        upgraded: tier.is_some(),
        tier,
    }))
}

/// POST /api/vip/:user_id/grant - 手动授予等级
pub async fn grant(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<GrantPayload>,
) -> AppResult<Json<User>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user_id = parse_record("user", &user_id)?;
    let user = state
        .loyalty
        .grant(&user_id, payload.tier, payload.term_days)
        .await?;
    Ok(Json(user))
}

/// POST /api/vip/:user_id/revoke - 撤销会员
pub async fn revoke(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<User>> {
    let user_id = parse_record("user", &user_id)?;
    let user = state.loyalty.revoke(&user_id).await?;
    Ok(Json(user))
}

/// POST /api/vip/:user_id/extend - 延长有效期
pub async fn extend(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ExtendPayload>,
) -> AppResult<Json<User>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user_id = parse_record("user", &user_id)?;
    let user = state.loyalty.extend(&user_id, payload.days).await?;
    Ok(Json(user))
}
