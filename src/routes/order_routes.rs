use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::order_dto::{
    AssignTransportRequest, CreateOrderRequest, UpdateOrderRequest, UpdateOrderStatusRequest,
};
use crate::dto::{ApiResponse, VisibilityQuery};
use crate::models::Order;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};

use super::deleted;

/// Cabecera con el usuario que origina el pedido
pub const ACTOR_HEADER: &str = "x-actor-id";

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/restore", post(restore_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/transport", put(assign_transport))
}

// La autenticación es externa: el llamador identifica al actor por cabecera
fn actor_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    match headers.get(ACTOR_HEADER) {
        None => Ok(Uuid::nil()),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| validation_error("x-actor-id must be a UUID")),
    }
}

async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let order = state.services.orders.create_order(actor, request).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Order created".to_string())))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.services.orders.list_orders(query.visibility()).await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.services.orders.get_order(id, query.visibility()).await?))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = state.services.orders.update_order_status(id, request.status).await?;
    Ok(Json(ApiResponse::success(order)))
}

async fn assign_transport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTransportRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = state.services.orders.assign_transport(id, request.transport_id).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Transport assigned".to_string())))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.services.lifecycle.delete_order(id).await?;
    Ok(deleted("Order"))
}

async fn restore_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = state.services.lifecycle.restore_order(id).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Order restored".to_string())))
}
