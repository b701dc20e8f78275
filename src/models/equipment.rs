//! Modelo de Equipment
//!
//! La ubicación de un equipo se guarda en tres columnas anulables, de las
//! cuales como mucho una puede estar informada. `Placement` es la vista
//! tipada de esas tres columnas y la única forma de escribirlas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{validation_error, AppResult};

/// Ubicación actual de un equipo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Placement {
    Unplaced,
    ClientObject(Uuid),
    Warehouse(Uuid),
    Transport(Uuid),
}

impl Placement {
    /// Construye la ubicación a partir de las tres columnas; más de una es una contradicción
    pub fn from_fields(
        client_object_id: Option<Uuid>,
        warehouse_id: Option<Uuid>,
        transport_id: Option<Uuid>,
    ) -> AppResult<Self> {
        match (client_object_id, warehouse_id, transport_id) {
            (None, None, None) => Ok(Placement::Unplaced),
            (Some(id), None, None) => Ok(Placement::ClientObject(id)),
            (None, Some(id), None) => Ok(Placement::Warehouse(id)),
            (None, None, Some(id)) => Ok(Placement::Transport(id)),
            _ => Err(validation_error(
                "equipment placement must name at most one of client object, warehouse or transport",
            )),
        }
    }

    pub fn is_unplaced(&self) -> bool {
        matches!(self, Placement::Unplaced)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Equipment {
    pub id: Uuid,
    pub kind: String,
    pub condition: String,
    pub volume: Decimal,
    pub number: Option<String>,
    pub client_object_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub transport_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Equipment {
    pub fn placement(&self) -> AppResult<Placement> {
        Placement::from_fields(self.client_object_id, self.warehouse_id, self.transport_id)
    }

    /// Reescribe las tres columnas a la vez
    pub fn set_placement(&mut self, placement: Placement) {
        self.client_object_id = None;
        self.warehouse_id = None;
        self.transport_id = None;
        match placement {
            Placement::Unplaced => {}
            Placement::ClientObject(id) => self.client_object_id = Some(id),
            Placement::Warehouse(id) => self.warehouse_id = Some(id),
            Placement::Transport(id) => self.transport_id = Some(id),
        }
    }

    /// Disponible para asignar: sin ninguna ubicación
    pub fn is_available(&self) -> bool {
        self.client_object_id.is_none() && self.warehouse_id.is_none() && self.transport_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ErrorKind;

    fn equipment() -> Equipment {
        let now = Utc::now();
        Equipment {
            id: Uuid::new_v4(),
            kind: "container".into(),
            condition: "good".into(),
            volume: Decimal::new(1200, 2),
            number: None,
            client_object_id: None,
            warehouse_id: None,
            transport_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_two_locations_is_a_validation_error() {
        let err = Placement::from_fields(Some(Uuid::new_v4()), Some(Uuid::new_v4()), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_set_placement_keeps_at_most_one_column() {
        let mut eq = equipment();
        let warehouse = Uuid::new_v4();
        let transport = Uuid::new_v4();

        eq.set_placement(Placement::Warehouse(warehouse));
        assert_eq!(eq.placement().unwrap(), Placement::Warehouse(warehouse));
        assert!(!eq.is_available());

        eq.set_placement(Placement::Transport(transport));
        assert_eq!(eq.warehouse_id, None);
        assert_eq!(eq.placement().unwrap(), Placement::Transport(transport));

        eq.set_placement(Placement::Unplaced);
        assert!(eq.is_available());
    }
}
