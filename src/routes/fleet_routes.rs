use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::fleet_dto::{
    AssignDriverRequest, AssignEquipmentRequest, CreateDriverRequest, CreateTransportRequest,
    UpdateDriverRequest, UpdateTransportRequest,
};
use crate::dto::{ApiResponse, VisibilityQuery};
use crate::models::{Driver, Transport};
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::deleted;

pub fn create_transport_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transport).get(list_transports))
        .route("/:id", get(get_transport).put(update_transport).delete(delete_transport))
        .route("/:id/restore", post(restore_transport))
        .route("/:id/driver", put(assign_driver).delete(unassign_driver))
        .route("/:id/equipment", put(assign_equipment).delete(unassign_equipment))
}

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver).get(list_drivers))
        .route("/:id", get(get_driver).put(update_driver).delete(delete_driver))
        .route("/:id/restore", post(restore_driver))
}

async fn create_transport(
    State(state): State<AppState>,
    Json(request): Json<CreateTransportRequest>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.fleet.create_transport(request).await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Transport created".to_string())))
}

async fn list_transports(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Transport>>, AppError> {
    Ok(Json(state.services.fleet.list_transports(query.visibility()).await?))
}

async fn get_transport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Transport>, AppError> {
    Ok(Json(state.services.fleet.get_transport(id, query.visibility()).await?))
}

async fn update_transport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTransportRequest>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.fleet.update_transport(id, request).await?;
    Ok(Json(ApiResponse::success(transport)))
}

async fn delete_transport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_transport(id).await?;
    Ok(deleted("Transport"))
}

async fn restore_transport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.lifecycle.restore_transport(id).await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Transport restored".to_string())))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.assignments.assign_driver(id, request.driver_id).await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Driver assigned".to_string())))
}

async fn unassign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.assignments.unassign_driver(id).await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Driver unassigned".to_string())))
}

async fn assign_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignEquipmentRequest>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state
        .services
        .assignments
        .assign_equipment(id, request.equipment_id)
        .await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Equipment assigned".to_string())))
}

async fn unassign_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Transport>>, AppError> {
    let transport = state.services.assignments.unassign_equipment(id).await?;
    Ok(Json(ApiResponse::success_with_message(transport, "Equipment unassigned".to_string())))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.services.fleet.create_driver(request).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Driver created".to_string())))
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Driver>>, AppError> {
    Ok(Json(state.services.fleet.list_drivers(query.visibility()).await?))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.services.fleet.get_driver(id, query.visibility()).await?))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.services.fleet.update_driver(id, request).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_driver(id).await?;
    Ok(deleted("Driver"))
}

async fn restore_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.services.lifecycle.restore_driver(id).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Driver restored".to_string())))
}
