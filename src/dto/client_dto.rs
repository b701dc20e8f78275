use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::patch::Patch;

// Request para crear un cliente
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

// Request para actualizar un cliente
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
}

// Request para crear un objeto (sitio) de cliente
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientObjectRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Object name is required"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

// Request para actualizar un objeto de cliente; el cliente propietario no cambia
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClientObjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Patch<String>,
}

// Request para crear un almacén
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 255, message = "Warehouse name is required"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

// Request para actualizar un almacén
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Patch<String>,
}
