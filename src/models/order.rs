//! Modelo de Order y su máquina de estados
//!
//! Grafo de transiciones:
//!
//! ```text
//! DRAFT ──► SCHEDULED ──► IN_PROGRESS ──► COMPLETED
//!   │           │              │
//!   └───────────┴──────────────┴────────► CANCELLED
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del pedido - mapea al ENUM order_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Draft,
        OrderStatus::Scheduled,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Estados que impiden borrar las entidades referenciadas
    pub const BLOCKING: [OrderStatus; 3] = [
        OrderStatus::Draft,
        OrderStatus::Scheduled,
        OrderStatus::InProgress,
    ];

    pub fn next_states(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Draft => &[OrderStatus::Scheduled, OrderStatus::Cancelled],
            OrderStatus::Scheduled => &[OrderStatus::InProgress, OrderStatus::Cancelled],
            OrderStatus::InProgress => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    /// Pedir el estado actual se acepta como no-op
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == next || self.next_states().contains(&next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Scheduled => "SCHEDULED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Etiqueta del ENUM en PostgreSQL
    pub fn db_label(self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Scheduled => "scheduled",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub object_id: Uuid,
    pub transport_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub status: OrderStatus,
    pub priority: i16,
    pub comment: Option<String>,
    pub planned_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Referencia desde un pedido hacia otra entidad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLink {
    Client(Uuid),
    Object(Uuid),
    Transport(Uuid),
    Driver(Uuid),
}

impl OrderLink {
    pub fn matches(&self, order: &Order) -> bool {
        match *self {
            OrderLink::Client(id) => order.client_id == id,
            OrderLink::Object(id) => order.object_id == id,
            OrderLink::Transport(id) => order.transport_id == Some(id),
            OrderLink::Driver(id) => order.driver_id == Some(id),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            OrderLink::Client(_) => "client_id",
            OrderLink::Object(_) => "object_id",
            OrderLink::Transport(_) => "transport_id",
            OrderLink::Driver(_) => "driver_id",
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            OrderLink::Client(id)
            | OrderLink::Object(id)
            | OrderLink::Transport(id)
            | OrderLink::Driver(id) => id,
        }
    }
}
