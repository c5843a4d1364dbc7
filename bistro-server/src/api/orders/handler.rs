//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{DeliveryType, Order, OrderStatus, PaymentMethod};
use crate::db::repository::OrderRepository;
use crate::orders::{CreateOrderInput, OrderItemInput};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderPayload {
    pub user_id: String,
    #[validate(length(min = 1, message = "Order must have at least one item"))]
    #[validate(nested)]
    pub items: Vec<OrderItemPayload>,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    #[validate(range(min = 1, max = 50, message = "Party size must be between 1 and 50"))]
    pub party_size: Option<i64>,
    pub notes: Option<String>,
}

// Serialize: validator embeds the rejected list in its error params
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemPayload {
    pub menu_item: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelPayload {
    pub cancelled_by: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
}

/// POST /api/orders - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderPayload>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        items.push(OrderItemInput {
            menu_item: parse_record("menu_item", &item.menu_item)?,
            quantity: item.quantity,
            special_instructions: item.special_instructions.clone(),
        });
    }

    let input = CreateOrderInput {
        user_id: parse_record("user", &payload.user_id)?,
        items,
        payment_method: payload.payment_method,
        delivery_type: payload.delivery_type,
        delivery_address: payload.delivery_address,
        party_size: payload.party_size,
        notes: payload.notes,
    };

    let order = state.orchestrator.create_order(input).await?;
    Ok(Json(order))
}

/// GET /api/orders/:id - 查询订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let id = parse_record("orders", &id)?;
    let order = repo.find_by_id(&id).await?;
    Ok(Json(order))
}

/// GET /api/orders/user/:user_id - 查询用户全部订单
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let user_id = parse_record("user", &user_id)?;
    let orders = repo.find_by_user(&user_id).await?;
    Ok(Json(orders))
}

/// POST /api/orders/:id/cancel - 取消订单
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CancelPayload>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let id = parse_record("orders", &id)?;
    let cancelled_by = parse_record("user", &payload.cancelled_by)?;
    let order = state
        .orchestrator
        .cancel_order(&id, &cancelled_by, payload.reason)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/status - 推进订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Order>> {
    let id = parse_record("orders", &id)?;
    let order = state
        .orchestrator
        .update_order_status(&id, payload.status)
        .await?;
    Ok(Json(order))
}
