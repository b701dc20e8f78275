use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::utils::patch::Patch;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

fn number_not_blank(value: &Patch<String>) -> Result<(), ValidationError> {
    match value.as_set() {
        Some(number) if number.trim().is_empty() => Err(ValidationError::new("blank")),
        _ => Ok(()),
    }
}

// Request para crear un equipo; como mucho una ubicación inicial
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub kind: String,
    #[validate(length(min = 1, max = 100))]
    pub condition: String,
    #[validate(custom = "non_negative")]
    pub volume: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub number: Option<String>,
    pub client_object_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
}

// Request para actualizar un equipo.
// Informar una ubicación mueve el equipo allí; `null` lo retira de ella.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEquipmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub kind: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub condition: Option<String>,
    #[validate(custom = "non_negative")]
    pub volume: Option<Decimal>,
    #[serde(default)]
    #[validate(custom = "number_not_blank")]
    pub number: Patch<String>,
    #[serde(default)]
    pub client_object_id: Patch<Uuid>,
    #[serde(default)]
    pub warehouse_id: Patch<Uuid>,
}

impl UpdateEquipmentRequest {
    pub fn touches_placement(&self) -> bool {
        !self.client_object_id.is_keep() || !self.warehouse_id.is_keep()
    }
}
