use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::equipment_dto::{CreateEquipmentRequest, UpdateEquipmentRequest};
use crate::dto::{ApiResponse, VisibilityQuery};
use crate::models::Equipment;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::deleted;

pub fn create_equipment_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_equipment).get(list_equipment))
        .route("/:id", get(get_equipment).put(update_equipment).delete(delete_equipment))
        .route("/:id/restore", post(restore_equipment))
}

async fn create_equipment(
    State(state): State<AppState>,
    Json(request): Json<CreateEquipmentRequest>,
) -> Result<Json<ApiResponse<Equipment>>, AppError> {
    let equipment = state.services.equipment.create_equipment(request).await?;
    Ok(Json(ApiResponse::success_with_message(equipment, "Equipment created".to_string())))
}

async fn list_equipment(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Equipment>>, AppError> {
    Ok(Json(state.services.equipment.list_equipment(query.visibility()).await?))
}

async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Equipment>, AppError> {
    Ok(Json(state.services.equipment.get_equipment(id, query.visibility()).await?))
}

async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEquipmentRequest>,
) -> Result<Json<ApiResponse<Equipment>>, AppError> {
    let equipment = state.services.equipment.update_equipment(id, request).await?;
    Ok(Json(ApiResponse::success(equipment)))
}

async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_equipment(id).await?;
    Ok(deleted("Equipment"))
}

async fn restore_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Equipment>>, AppError> {
    let equipment = state.services.lifecycle.restore_equipment(id).await?;
    Ok(Json(ApiResponse::success_with_message(equipment, "Equipment restored".to_string())))
}
