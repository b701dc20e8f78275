use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::client_dto::{
    CreateClientObjectRequest, CreateClientRequest, CreateWarehouseRequest,
    UpdateClientObjectRequest, UpdateClientRequest, UpdateWarehouseRequest,
};
use crate::dto::{ApiResponse, VisibilityQuery};
use crate::models::{Client, ClientObject, Warehouse};
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::deleted;

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_client).get(list_clients))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
        .route("/:id/restore", post(restore_client))
}

pub fn create_client_object_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_client_object).get(list_client_objects))
        .route(
            "/:id",
            get(get_client_object).put(update_client_object).delete(delete_client_object),
        )
        .route("/:id/restore", post(restore_client_object))
}

pub fn create_warehouse_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_warehouse).get(list_warehouses))
        .route("/:id", get(get_warehouse).put(update_warehouse).delete(delete_warehouse))
        .route("/:id/restore", post(restore_warehouse))
}

async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = state.services.clients.create_client(request).await?;
    Ok(Json(ApiResponse::success_with_message(client, "Client created".to_string())))
}

async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(state.services.clients.list_clients(query.visibility()).await?))
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(state.services.clients.get_client(id, query.visibility()).await?))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = state.services.clients.update_client(id, request).await?;
    Ok(Json(ApiResponse::success(client)))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_client(id).await?;
    Ok(deleted("Client"))
}

async fn restore_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = state.services.lifecycle.restore_client(id).await?;
    Ok(Json(ApiResponse::success_with_message(client, "Client restored".to_string())))
}

async fn create_client_object(
    State(state): State<AppState>,
    Json(request): Json<CreateClientObjectRequest>,
) -> Result<Json<ApiResponse<ClientObject>>, AppError> {
    let object = state.services.clients.create_client_object(request).await?;
    Ok(Json(ApiResponse::success_with_message(object, "Client object created".to_string())))
}

async fn list_client_objects(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<ClientObject>>, AppError> {
    Ok(Json(state.services.clients.list_client_objects(query.visibility()).await?))
}

async fn get_client_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<ClientObject>, AppError> {
    Ok(Json(state.services.clients.get_client_object(id, query.visibility()).await?))
}

async fn update_client_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientObjectRequest>,
) -> Result<Json<ApiResponse<ClientObject>>, AppError> {
    let object = state.services.clients.update_client_object(id, request).await?;
    Ok(Json(ApiResponse::success(object)))
}

async fn delete_client_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_client_object(id).await?;
    Ok(deleted("Client object"))
}

async fn restore_client_object(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClientObject>>, AppError> {
    let object = state.services.lifecycle.restore_client_object(id).await?;
    Ok(Json(ApiResponse::success_with_message(object, "Client object restored".to_string())))
}

async fn create_warehouse(
    State(state): State<AppState>,
    Json(request): Json<CreateWarehouseRequest>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = state.services.clients.create_warehouse(request).await?;
    Ok(Json(ApiResponse::success_with_message(warehouse, "Warehouse created".to_string())))
}

async fn list_warehouses(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Warehouse>>, AppError> {
    Ok(Json(state.services.clients.list_warehouses(query.visibility()).await?))
}

async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Warehouse>, AppError> {
    Ok(Json(state.services.clients.get_warehouse(id, query.visibility()).await?))
}

async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWarehouseRequest>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = state.services.clients.update_warehouse(id, request).await?;
    Ok(Json(ApiResponse::success(warehouse)))
}

async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_warehouse(id).await?;
    Ok(deleted("Warehouse"))
}

async fn restore_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = state.services.lifecycle.restore_warehouse(id).await?;
    Ok(Json(ApiResponse::success_with_message(warehouse, "Warehouse restored".to_string())))
}
