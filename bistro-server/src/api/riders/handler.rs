//! Rider API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::api::parse_record;
use crate::core::ServerState;
use crate::db::models::{GeoPoint, Rider};
use crate::db::repository::RiderRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AvailabilityPayload {
    pub available: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LocationPayload {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// GET /api/riders - 获取空闲骑手
pub async fn list_available(State(state): State<ServerState>) -> AppResult<Json<Vec<Rider>>> {
    let repo = RiderRepository::new(state.db.clone());
    let riders = repo.find_available().await?;
    Ok(Json(riders))
}

/// POST /api/riders - 注册骑手
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<Rider>,
) -> AppResult<Json<Rider>> {
    if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
        return Err(AppError::validation("Rider needs a name and a phone number"));
    }
    let repo = RiderRepository::new(state.db.clone());
    let rider = repo.create(payload).await?;
    Ok(Json(rider))
}

/// PUT /api/riders/:id/availability - 上下线切换
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AvailabilityPayload>,
) -> AppResult<Json<Rider>> {
    let repo = RiderRepository::new(state.db.clone());
    let id = parse_record("rider", &id)?;
    let rider = repo.set_availability(&id, payload.available).await?;
    Ok(Json(rider))
}

/// PUT /api/riders/:id/location - 上报位置
pub async fn set_location(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<LocationPayload>,
) -> AppResult<Json<Rider>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let repo = RiderRepository::new(state.db.clone());
    let id = parse_record("rider", &id)?;
    let rider = repo
        .set_location(
            &id,
            GeoPoint {
                lat: payload.lat,
                lng: payload.lng,
            },
        )
        .await?;
    Ok(Json(rider))
}
