//! Rutas HTTP
//!
//! Adaptador fino sobre los servicios: decodifica, delega y deja que
//! `AppError` elija el código de estado.

pub mod client_routes;
pub mod equipment_routes;
pub mod fleet_routes;
pub mod order_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/clients", client_routes::create_client_router())
        .nest("/api/client-objects", client_routes::create_client_object_router())
        .nest("/api/warehouses", client_routes::create_warehouse_router())
        .nest("/api/transports", fleet_routes::create_transport_router())
        .nest("/api/drivers", fleet_routes::create_driver_router())
        .nest("/api/equipment", equipment_routes::create_equipment_router())
        .nest("/api/orders", order_routes::create_order_router())
        .route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn deleted(resource: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": format!("{} deleted", resource),
    }))
}
