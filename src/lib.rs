//! Motor de consistencia y ciclo de vida de una flota logística
//!
//! Clientes, objetos de cliente, almacenes, transportes, conductores,
//! equipos y pedidos, con asignaciones exclusivas, borrado lógico con
//! guardas y la máquina de estados de pedidos.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Router completo con las capas HTTP comunes
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    routes::create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(cors_origins))
        .with_state(state)
}
