//! Capa de persistencia
//!
//! Cada entidad expone su contrato de persistencia como un trait de
//! capacidades. Los servicios dependen sólo de los traits que usan; la
//! implementación concreta (repositorios PostgreSQL o `InMemoryStore`) se elige al
//! construir el estado de la aplicación.
//!
//! Las invariantes de exclusividad y unicidad viven también en el almacén:
//! una escritura que las violaría falla con `StoreError::UniqueViolation`
//! aunque la comprobación previa del servicio haya pasado.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Client, ClientObject, Driver, Equipment, Order, OrderLink, OrderStatus, Placement, Transport,
    Warehouse,
};

pub mod client_repository;
pub mod driver_repository;
pub mod equipment_repository;
pub mod memory;
pub mod order_repository;
pub mod pg;
pub mod transport_repository;

pub use memory::InMemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("no rows affected in {0}")]
    NoRowsAffected(&'static str),

    #[error("referenced row in {0} is missing or deleted")]
    MissingReference(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Política única de visibilidad del borrado lógico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    ActiveOnly,
    IncludeDeleted,
}

impl Visibility {
    pub fn from_include_deleted(include_deleted: bool) -> Self {
        if include_deleted {
            Visibility::IncludeDeleted
        } else {
            Visibility::ActiveOnly
        }
    }

    /// Fragmento SQL que se añade a un WHERE existente
    pub fn sql_filter(self) -> &'static str {
        match self {
            Visibility::ActiveOnly => " AND deleted_at IS NULL",
            Visibility::IncludeDeleted => "",
        }
    }

    pub fn admits(self, deleted_at: Option<DateTime<Utc>>) -> bool {
        match self {
            Visibility::ActiveOnly => deleted_at.is_none(),
            Visibility::IncludeDeleted => true,
        }
    }
}

/// Nombres de las restricciones de unicidad sobre filas activas.
/// Coinciden con los índices parciales de `migrations/`.
pub mod constraints {
    pub const CLIENT_NAME: &str = "clients_name_active_uniq";
    pub const CLIENT_OBJECT_NAME: &str = "client_objects_name_active_uniq";
    pub const WAREHOUSE_NAME: &str = "warehouses_name_active_uniq";
    pub const DRIVER_LICENSE: &str = "drivers_license_active_uniq";
    pub const TRANSPORT_PLATE: &str = "transports_plate_active_uniq";
    pub const TRANSPORT_CURRENT_DRIVER: &str = "transports_current_driver_uniq";
    pub const TRANSPORT_CURRENT_EQUIPMENT: &str = "transports_current_equipment_uniq";
    pub const EQUIPMENT_NUMBER: &str = "equipment_number_active_uniq";
    pub const EQUIPMENT_TRANSPORT: &str = "equipment_transport_uniq";

    pub fn describe(constraint: &str) -> &'static str {
        match constraint {
            CLIENT_NAME => "client name already in use",
            CLIENT_OBJECT_NAME => "client object name already in use for this client",
            WAREHOUSE_NAME => "warehouse name already in use",
            DRIVER_LICENSE => "license number already in use",
            TRANSPORT_PLATE => "plate number already in use",
            TRANSPORT_CURRENT_DRIVER => "driver already assigned to another transport",
            TRANSPORT_CURRENT_EQUIPMENT | EQUIPMENT_TRANSPORT => {
                "equipment already assigned to another transport"
            }
            EQUIPMENT_NUMBER => "equipment number already in use",
            _ => "unique constraint violated",
        }
    }
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn insert_client(&self, client: &Client) -> StoreResult<Client>;
    async fn get_client(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Client>>;
    async fn list_clients(&self, visibility: Visibility) -> StoreResult<Vec<Client>>;
    /// `None` si la fila no existe o está borrada
    async fn update_client(&self, client: &Client) -> StoreResult<Option<Client>>;
    /// Sólo borra si la fila está activa y sin objetos ni pedidos abiertos
    async fn soft_delete_client(&self, id: Uuid) -> StoreResult<bool>;
    async fn restore_client(&self, id: Uuid) -> StoreResult<bool>;
    async fn client_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
}

#[async_trait]
pub trait ClientObjectStore: Send + Sync {
    async fn insert_client_object(&self, object: &ClientObject) -> StoreResult<ClientObject>;
    async fn get_client_object(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<ClientObject>>;
    async fn list_client_objects(&self, visibility: Visibility) -> StoreResult<Vec<ClientObject>>;
    async fn update_client_object(&self, object: &ClientObject) -> StoreResult<Option<ClientObject>>;
    /// Sólo borra si no hay pedidos abiertos ni equipos ubicados en el objeto
    async fn soft_delete_client_object(&self, id: Uuid) -> StoreResult<bool>;
    /// Falla con `MissingReference` si el cliente ya no está activo al escribir
    async fn restore_client_object(&self, id: Uuid) -> StoreResult<bool>;
    async fn client_object_name_taken(
        &self,
        client_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool>;
    async fn count_active_client_objects(&self, client_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait WarehouseStore: Send + Sync {
    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Warehouse>;
    async fn get_warehouse(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Warehouse>>;
    async fn list_warehouses(&self, visibility: Visibility) -> StoreResult<Vec<Warehouse>>;
    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Option<Warehouse>>;
    /// Sólo borra si no hay equipos almacenados
    async fn soft_delete_warehouse(&self, id: Uuid) -> StoreResult<bool>;
    async fn restore_warehouse(&self, id: Uuid) -> StoreResult<bool>;
    async fn warehouse_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn insert_driver(&self, driver: &Driver) -> StoreResult<Driver>;
    async fn get_driver(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Driver>>;
    async fn list_drivers(&self, visibility: Visibility) -> StoreResult<Vec<Driver>>;
    async fn update_driver(&self, driver: &Driver) -> StoreResult<Option<Driver>>;
    /// Sólo borra si ningún transporte activo lo lleva y no hay pedidos abiertos suyos
    async fn soft_delete_driver(&self, id: Uuid) -> StoreResult<bool>;
    async fn restore_driver(&self, id: Uuid) -> StoreResult<bool>;
    async fn license_taken(&self, license_number: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
}

#[async_trait]
pub trait TransportStore: Send + Sync {
    async fn insert_transport(&self, transport: &Transport) -> StoreResult<Transport>;
    async fn get_transport(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Transport>>;
    async fn list_transports(&self, visibility: Visibility) -> StoreResult<Vec<Transport>>;
    /// Escribe los campos descriptivos; los punteros de asignación no se tocan
    async fn update_transport(&self, transport: &Transport) -> StoreResult<Option<Transport>>;
    /// Sólo borra si no tiene conductor, equipo ni pedidos abiertos
    async fn soft_delete_transport(&self, id: Uuid) -> StoreResult<bool>;
    async fn restore_transport(&self, id: Uuid) -> StoreResult<bool>;
    async fn plate_taken(&self, plate_number: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
    /// Transporte activo cuyo conductor actual es `driver_id`
    async fn find_transport_by_driver(&self, driver_id: Uuid) -> StoreResult<Option<Transport>>;
    /// Transporte activo cuyo equipo actual es `equipment_id`
    async fn find_transport_by_equipment(&self, equipment_id: Uuid) -> StoreResult<Option<Transport>>;
    /// Fija o limpia el conductor actual. Con `Some`, el conductor debe seguir
    /// activo (`MissingReference`) y libre (`UniqueViolation`) al escribir.
    async fn set_current_driver(
        &self,
        transport_id: Uuid,
        driver_id: Option<Uuid>,
    ) -> StoreResult<Option<Transport>>;
    /// Escribe `transport.current_equipment_id` y `equipment.transport_id` en
    /// una sola transacción; si alguna escritura no afecta filas no se aplica nada.
    async fn attach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport>;
    /// Inverso de `attach_equipment`, con la misma atomicidad
    async fn detach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport>;
}

#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<Equipment>;
    async fn get_equipment(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Equipment>>;
    async fn list_equipment(&self, visibility: Visibility) -> StoreResult<Vec<Equipment>>;
    /// Falla con `None` si el equipo fue asignado a un transporte entretanto
    async fn update_equipment(&self, equipment: &Equipment) -> StoreResult<Option<Equipment>>;
    /// Sólo borra si no está montado en un transporte
    async fn soft_delete_equipment(&self, id: Uuid) -> StoreResult<bool>;
    /// Falla con `MissingReference` si el destino de la ubicación ya no está activo
    async fn restore_equipment(&self, id: Uuid) -> StoreResult<bool>;
    async fn equipment_number_taken(&self, number: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
    async fn count_equipment_at(&self, placement: Placement) -> StoreResult<i64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> StoreResult<Order>;
    async fn get_order(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Order>>;
    async fn list_orders(&self, visibility: Visibility) -> StoreResult<Vec<Order>>;
    /// Escribe la fila completa si sigue activa y su estado sigue siendo
    /// `expected_status`; `None` en otro caso
    async fn update_order(&self, order: &Order, expected_status: OrderStatus) -> StoreResult<Option<Order>>;
    /// Compare-and-set del estado: `None` si el pedido no está activo o su
    /// estado ya no es `from`
    async fn update_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>>;
    async fn soft_delete_order(&self, id: Uuid) -> StoreResult<bool>;
    /// Falla con `MissingReference` si alguna fila referenciada ya no está activa
    async fn restore_order(&self, id: Uuid) -> StoreResult<bool>;
    /// Pedidos activos enlazados a `link` cuyo estado está en `statuses`
    async fn count_orders(&self, link: OrderLink, statuses: &[OrderStatus]) -> StoreResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_policy() {
        let now = Some(Utc::now());
        assert!(Visibility::ActiveOnly.admits(None));
        assert!(!Visibility::ActiveOnly.admits(now));
        assert!(Visibility::IncludeDeleted.admits(now));
        assert_eq!(Visibility::IncludeDeleted.sql_filter(), "");
        assert_eq!(Visibility::from_include_deleted(false), Visibility::ActiveOnly);
    }
}
