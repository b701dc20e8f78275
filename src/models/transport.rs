//! Modelo de Transport
//!
//! Mapea a la tabla transports. `current_driver_id` y `current_equipment_id`
//! son exclusivos entre transportes activos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del transporte - mapea al ENUM transport_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "transport_status", rename_all = "snake_case")]
pub enum TransportStatus {
    InWork,
    Idle,
    Repair,
    WrittenOff,
}

impl TransportStatus {
    /// Sólo un transporte en servicio puede recibir pedidos
    pub fn is_working(self) -> bool {
        matches!(self, TransportStatus::InWork)
    }
}

impl Default for TransportStatus {
    fn default() -> Self {
        TransportStatus::InWork
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transport {
    pub id: Uuid,
    pub plate_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: Decimal,
    pub status: TransportStatus,
    pub current_driver_id: Option<Uuid>,
    pub current_equipment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
