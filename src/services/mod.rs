//! Services module
//!
//! Este módulo contiene la lógica de negocio: registro de entidades,
//! asignaciones transporte↔conductor/equipo, borrado lógico con guardas
//! y la máquina de estados de pedidos. Los servicios sólo dependen de los
//! traits de persistencia que usan.

pub mod assignment_service;
pub mod client_service;
pub mod equipment_service;
pub mod fleet_service;
pub mod lifecycle_service;
pub mod order_service;
pub mod validators;

use std::sync::Arc;

use sqlx::PgPool;

use crate::repositories::client_repository::{
    ClientObjectRepository, ClientRepository, WarehouseRepository,
};
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::equipment_repository::EquipmentRepository;
use crate::repositories::order_repository::OrderRepository;
use crate::repositories::transport_repository::TransportRepository;
use crate::repositories::{
    ClientObjectStore, ClientStore, DriverStore, EquipmentStore, InMemoryStore, OrderStore,
    TransportStore, WarehouseStore,
};

pub use assignment_service::AssignmentService;
pub use client_service::ClientService;
pub use equipment_service::EquipmentService;
pub use fleet_service::FleetService;
pub use lifecycle_service::LifecycleService;
pub use order_service::OrderService;

/// Conjunto de almacenes por entidad, elegido al construir la aplicación
#[derive(Clone)]
pub struct Stores {
    pub clients: Arc<dyn ClientStore>,
    pub client_objects: Arc<dyn ClientObjectStore>,
    pub warehouses: Arc<dyn WarehouseStore>,
    pub drivers: Arc<dyn DriverStore>,
    pub transports: Arc<dyn TransportStore>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    /// Todas las entidades comparten un único `InMemoryStore`
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            clients: store.clone(),
            client_objects: store.clone(),
            warehouses: store.clone(),
            drivers: store.clone(),
            transports: store.clone(),
            equipment: store.clone(),
            orders: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            clients: Arc::new(ClientRepository::new(pool.clone())),
            client_objects: Arc::new(ClientObjectRepository::new(pool.clone())),
            warehouses: Arc::new(WarehouseRepository::new(pool.clone())),
            drivers: Arc::new(DriverRepository::new(pool.clone())),
            transports: Arc::new(TransportRepository::new(pool.clone())),
            equipment: Arc::new(EquipmentRepository::new(pool.clone())),
            orders: Arc::new(OrderRepository::new(pool)),
        }
    }
}

/// Servicios de la aplicación listos para compartir entre handlers
#[derive(Clone)]
pub struct FleetServices {
    pub clients: Arc<ClientService>,
    pub fleet: Arc<FleetService>,
    pub equipment: Arc<EquipmentService>,
    pub assignments: Arc<AssignmentService>,
    pub lifecycle: Arc<LifecycleService>,
    pub orders: Arc<OrderService>,
}

impl FleetServices {
    pub fn new(stores: Stores) -> Self {
        Self {
            clients: Arc::new(ClientService::new(&stores)),
            fleet: Arc::new(FleetService::new(&stores)),
            equipment: Arc::new(EquipmentService::new(&stores)),
            assignments: Arc::new(AssignmentService::new(&stores)),
            lifecycle: Arc::new(LifecycleService::new(stores.clone())),
            orders: Arc::new(OrderService::new(&stores)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Stores::in_memory())
    }
}
