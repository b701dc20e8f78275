//! DTOs de la API
//!
//! Requests ya decodificados que reciben los servicios. Los campos anulables
//! de los requests de actualización usan `Patch` para distinguir ausencia,
//! `null` explícito y valor.

pub mod client_dto;
pub mod equipment_dto;
pub mod fleet_dto;
pub mod order_dto;

use serde::{Deserialize, Serialize};

use crate::repositories::Visibility;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

// Query `?include_deleted=true` para gets y listados
#[derive(Debug, Default, Deserialize)]
pub struct VisibilityQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

impl VisibilityQuery {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_include_deleted(self.include_deleted)
    }
}
