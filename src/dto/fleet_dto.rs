use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::TransportStatus;
use crate::utils::patch::Patch;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

// Request para crear un transporte
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransportRequest {
    #[validate(length(min = 1, max = 20, message = "Plate number is required"))]
    pub plate_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(custom = "non_negative")]
    pub capacity: Decimal,
    pub status: Option<TransportStatus>,
}

// Request para actualizar un transporte; conductor y equipo van por asignación
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransportRequest {
    #[validate(length(min = 1, max = 20))]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub brand: Patch<String>,
    #[serde(default)]
    pub model: Patch<String>,
    #[validate(custom = "non_negative")]
    pub capacity: Option<Decimal>,
    pub status: Option<TransportStatus>,
}

// Request para registrar un conductor
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50, message = "License number is required"))]
    pub license_number: String,
    #[serde(default)]
    pub license_classes: Vec<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub license_number: Option<String>,
    pub license_classes: Option<Vec<String>>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignEquipmentRequest {
    pub equipment_id: Uuid,
}
