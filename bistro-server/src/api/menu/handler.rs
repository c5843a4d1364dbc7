//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::MenuItem;
use crate::db::repository::MenuItemRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/menu - 获取在售菜品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let items = repo.find_all_available().await?;
    Ok(Json(items))
}

/// GET /api/menu/:id - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MenuItem>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let id = parse_record("menu_item", &id)?;
    let item = repo.find_by_id(&id).await?;
    Ok(Json(item))
}

/// POST /api/menu - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItem>,
) -> AppResult<Json<MenuItem>> {
    if !payload.price.is_finite() {
        return Err(AppError::validation("Price must be a finite number"));
    }
    if payload.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.create(payload).await?;
    Ok(Json(item))
}
