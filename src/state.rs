//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use crate::services::{FleetServices, Stores};

#[derive(Clone)]
pub struct AppState {
    pub services: FleetServices,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self {
            services: FleetServices::new(stores),
        }
    }

    /// Estado sobre el almacén en memoria, para tests y `STORE_BACKEND=memory`
    pub fn in_memory() -> Self {
        Self::new(Stores::in_memory())
    }
}
