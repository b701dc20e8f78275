//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL. Todas las entidades comparten el ciclo de vida de borrado
//! lógico mediante `deleted_at`.

pub mod client;
pub mod driver;
pub mod equipment;
pub mod order;
pub mod transport;

pub use client::{Client, ClientObject, Warehouse};
pub use driver::Driver;
pub use equipment::{Equipment, Placement};
pub use order::{Order, OrderLink, OrderStatus};
pub use transport::{Transport, TransportStatus};
