use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::OrderStatus;
use crate::utils::patch::Patch;

pub const MIN_PRIORITY: i16 = 0;
pub const MAX_PRIORITY: i16 = 10;
pub const MAX_COMMENT_CHARS: usize = 1000;

fn priority_in_range(value: &Patch<i16>) -> Result<(), ValidationError> {
    match value.as_set() {
        Some(p) if !(MIN_PRIORITY..=MAX_PRIORITY).contains(p) => Err(ValidationError::new("range")),
        _ => Ok(()),
    }
}

fn comment_length(value: &Patch<String>) -> Result<(), ValidationError> {
    match value.as_set() {
        Some(c) if c.chars().count() > MAX_COMMENT_CHARS => Err(ValidationError::new("length")),
        _ => Ok(()),
    }
}

// Request para crear un pedido; siempre nace en DRAFT
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub client_id: Uuid,
    pub object_id: Uuid,
    pub transport_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    #[validate(range(min = 0, max = 10))]
    #[serde(default)]
    pub priority: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    pub planned_at: Option<DateTime<Utc>>,
}

// Request para actualizar un pedido con semántica de tres estados por campo.
// `null` en un campo obligatorio (cliente, objeto, estado, prioridad) es inválido.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub client_id: Patch<Uuid>,
    #[serde(default)]
    pub object_id: Patch<Uuid>,
    #[serde(default)]
    pub transport_id: Patch<Uuid>,
    #[serde(default)]
    pub driver_id: Patch<Uuid>,
    #[serde(default)]
    pub status: Patch<OrderStatus>,
    #[serde(default)]
    #[validate(custom = "priority_in_range")]
    pub priority: Patch<i16>,
    #[serde(default)]
    #[validate(custom = "comment_length")]
    pub comment: Patch<String>,
    #[serde(default)]
    pub planned_at: Patch<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignTransportRequest {
    pub transport_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_keeps_absent_and_null_apart() {
        let req: UpdateOrderRequest =
            serde_json::from_str(r#"{"transport_id": null, "priority": 3}"#).unwrap();
        assert_eq!(req.transport_id, Patch::Clear);
        assert_eq!(req.driver_id, Patch::Keep);
        assert_eq!(req.priority, Patch::Set(3));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_priority_out_of_range_is_rejected() {
        let req: UpdateOrderRequest = serde_json::from_str(r#"{"priority": 42}"#).unwrap();
        assert!(req.validate().is_err());

        let create: CreateOrderRequest = serde_json::from_str(&format!(
            r#"{{"client_id": "{}", "object_id": "{}", "priority": -1}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_update_comment_length_is_bounded() {
        let at_limit = UpdateOrderRequest {
            comment: Patch::Set("é".repeat(MAX_COMMENT_CHARS)),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_long = UpdateOrderRequest {
            comment: Patch::Set("x".repeat(MAX_COMMENT_CHARS + 1)),
            ..Default::default()
        };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("comment"));

        let cleared = UpdateOrderRequest {
            comment: Patch::Clear,
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
    }
}
