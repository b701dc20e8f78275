//! Almacén en memoria
//!
//! Implementa todos los traits de persistencia sobre un único conjunto de
//! tablas protegido por un `RwLock`. Cada llamada toma el lock una sola vez,
//! así que cada operación es atómica igual que una sentencia (o transacción)
//! en PostgreSQL. Las restricciones de unicidad sobre filas activas y las
//! guardas de borrado replican las de la migración.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    constraints, ClientObjectStore, ClientStore, DriverStore, EquipmentStore, OrderStore,
    StoreError, StoreResult, TransportStore, Visibility, WarehouseStore,
};
use crate::models::{
    Client, ClientObject, Driver, Equipment, Order, OrderLink, OrderStatus, Placement, Transport,
    Warehouse,
};

/// Acceso común a las columnas del ciclo de vida
trait Row: Clone {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);

    fn is_active(&self) -> bool {
        self.deleted_at().is_none()
    }
}

macro_rules! impl_row {
    ($($ty:ty),*) => {
        $(impl Row for $ty {
            fn id(&self) -> Uuid { self.id }
            fn created_at(&self) -> DateTime<Utc> { self.created_at }
            fn deleted_at(&self) -> Option<DateTime<Utc>> { self.deleted_at }
            fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) { self.deleted_at = at; }
        })*
    };
}

impl_row!(Client, ClientObject, Warehouse, Driver, Transport, Equipment, Order);

fn get_row<T: Row>(table: &HashMap<Uuid, T>, id: Uuid, visibility: Visibility) -> Option<T> {
    table.get(&id).filter(|row| visibility.admits(row.deleted_at())).cloned()
}

fn list_rows<T: Row>(table: &HashMap<Uuid, T>, visibility: Visibility) -> Vec<T> {
    let mut rows: Vec<T> = table
        .values()
        .filter(|row| visibility.admits(row.deleted_at()))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    rows
}

fn active_rows<T: Row>(table: &HashMap<Uuid, T>) -> impl Iterator<Item = &T> {
    table.values().filter(|row| row.is_active())
}

fn unique<T: Row>(
    table: &HashMap<Uuid, T>,
    candidate: &T,
    constraint: &str,
    same_key: impl Fn(&T, &T) -> bool,
) -> StoreResult<()> {
    if !candidate.is_active() {
        return Ok(());
    }
    let clash = active_rows(table).any(|row| row.id() != candidate.id() && same_key(row, candidate));
    if clash {
        return Err(StoreError::UniqueViolation(constraint.to_string()));
    }
    Ok(())
}

#[derive(Default)]
struct Tables {
    clients: HashMap<Uuid, Client>,
    client_objects: HashMap<Uuid, ClientObject>,
    warehouses: HashMap<Uuid, Warehouse>,
    drivers: HashMap<Uuid, Driver>,
    transports: HashMap<Uuid, Transport>,
    equipment: HashMap<Uuid, Equipment>,
    orders: HashMap<Uuid, Order>,
}

impl Tables {
    fn check_client(&self, row: &Client) -> StoreResult<()> {
        unique(&self.clients, row, constraints::CLIENT_NAME, |a, b| a.name == b.name)
    }

    fn check_client_object(&self, row: &ClientObject) -> StoreResult<()> {
        unique(&self.client_objects, row, constraints::CLIENT_OBJECT_NAME, |a, b| {
            a.client_id == b.client_id && a.name == b.name
        })
    }

    fn check_warehouse(&self, row: &Warehouse) -> StoreResult<()> {
        unique(&self.warehouses, row, constraints::WAREHOUSE_NAME, |a, b| a.name == b.name)
    }

    fn check_driver(&self, row: &Driver) -> StoreResult<()> {
        unique(&self.drivers, row, constraints::DRIVER_LICENSE, |a, b| {
            a.license_number == b.license_number
        })
    }

    fn check_transport(&self, row: &Transport) -> StoreResult<()> {
        unique(&self.transports, row, constraints::TRANSPORT_PLATE, |a, b| {
            a.plate_number == b.plate_number
        })?;
        unique(&self.transports, row, constraints::TRANSPORT_CURRENT_DRIVER, |a, b| {
            b.current_driver_id.is_some() && a.current_driver_id == b.current_driver_id
        })?;
        unique(&self.transports, row, constraints::TRANSPORT_CURRENT_EQUIPMENT, |a, b| {
            b.current_equipment_id.is_some() && a.current_equipment_id == b.current_equipment_id
        })
    }

    fn check_equipment(&self, row: &Equipment) -> StoreResult<()> {
        unique(&self.equipment, row, constraints::EQUIPMENT_NUMBER, |a, b| {
            b.number.is_some() && a.number == b.number
        })?;
        unique(&self.equipment, row, constraints::EQUIPMENT_TRANSPORT, |a, b| {
            b.transport_id.is_some() && a.transport_id == b.transport_id
        })
    }

    fn require<T: Row>(table: &HashMap<Uuid, T>, id: Uuid, name: &'static str) -> StoreResult<()> {
        match table.get(&id) {
            Some(row) if row.is_active() => Ok(()),
            _ => Err(StoreError::MissingReference(name)),
        }
    }

    fn check_equipment_refs(&self, row: &Equipment) -> StoreResult<()> {
        if let Some(id) = row.client_object_id {
            Self::require(&self.client_objects, id, "client_objects")?;
        }
        if let Some(id) = row.warehouse_id {
            Self::require(&self.warehouses, id, "warehouses")?;
        }
        Ok(())
    }

    fn check_order_refs(&self, row: &Order) -> StoreResult<()> {
        Self::require(&self.clients, row.client_id, "clients")?;
        Self::require(&self.client_objects, row.object_id, "client_objects")?;
        if let Some(id) = row.transport_id {
            Self::require(&self.transports, id, "transports")?;
        }
        if let Some(id) = row.driver_id {
            Self::require(&self.drivers, id, "drivers")?;
        }
        Ok(())
    }

    fn open_orders(&self, link: OrderLink) -> bool {
        self.count_orders(link, &OrderStatus::BLOCKING) > 0
    }

    fn count_orders(&self, link: OrderLink, statuses: &[OrderStatus]) -> i64 {
        active_rows(&self.orders)
            .filter(|order| link.matches(order) && statuses.contains(&order.status))
            .count() as i64
    }

    fn equipment_at(&self, placement: Placement) -> i64 {
        active_rows(&self.equipment)
            .filter(|eq| eq.placement().map(|p| p == placement).unwrap_or(false))
            .count() as i64
    }
}

/// Borra lógicamente una fila activa si `blocked` es falso.
/// Sólo cambia `deleted_at`; el resto de columnas queda intacto.
fn soft_delete_row<T: Row>(table: &mut HashMap<Uuid, T>, id: Uuid, blocked: bool) -> bool {
    if blocked {
        return false;
    }
    match table.get_mut(&id) {
        Some(row) if row.is_active() => {
            row.set_deleted_at(Some(Utc::now()));
            true
        }
        _ => false,
    }
}

/// Candidato restaurado, o `None` si la fila no existe o no está borrada
fn restore_candidate<T: Row>(table: &HashMap<Uuid, T>, id: Uuid) -> Option<T> {
    let mut row = table.get(&id).filter(|row| !row.is_active())?.clone();
    row.set_deleted_at(None);
    Some(row)
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn insert_client(&self, client: &Client) -> StoreResult<Client> {
        let mut tables = self.tables.write().await;
        tables.check_client(client)?;
        tables.clients.insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn get_client(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Client>> {
        Ok(get_row(&self.tables.read().await.clients, id, visibility))
    }

    async fn list_clients(&self, visibility: Visibility) -> StoreResult<Vec<Client>> {
        Ok(list_rows(&self.tables.read().await.clients, visibility))
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        if get_row(&tables.clients, client.id, Visibility::ActiveOnly).is_none() {
            return Ok(None);
        }
        tables.check_client(client)?;
        tables.clients.insert(client.id, client.clone());
        Ok(Some(client.clone()))
    }

    async fn soft_delete_client(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = active_rows(&tables.client_objects).any(|o| o.client_id == id)
            || tables.open_orders(OrderLink::Client(id));
        Ok(soft_delete_row(&mut tables.clients, id, blocked))
    }

    async fn restore_client(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.clients, id) else {
            return Ok(false);
        };
        tables.check_client(&row)?;
        tables.clients.insert(id, row);
        Ok(true)
    }

    async fn client_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.clients).any(|c| c.name == name && Some(c.id) != exclude);
        Ok(taken)
    }
}

#[async_trait]
impl ClientObjectStore for InMemoryStore {
    async fn insert_client_object(&self, object: &ClientObject) -> StoreResult<ClientObject> {
        let mut tables = self.tables.write().await;
        Tables::require(&tables.clients, object.client_id, "clients")?;
        tables.check_client_object(object)?;
        tables.client_objects.insert(object.id, object.clone());
        Ok(object.clone())
    }

    async fn get_client_object(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<ClientObject>> {
        Ok(get_row(&self.tables.read().await.client_objects, id, visibility))
    }

    async fn list_client_objects(&self, visibility: Visibility) -> StoreResult<Vec<ClientObject>> {
        Ok(list_rows(&self.tables.read().await.client_objects, visibility))
    }

    async fn update_client_object(&self, object: &ClientObject) -> StoreResult<Option<ClientObject>> {
        let mut tables = self.tables.write().await;
        if get_row(&tables.client_objects, object.id, Visibility::ActiveOnly).is_none() {
            return Ok(None);
        }
        Tables::require(&tables.clients, object.client_id, "clients")?;
        tables.check_client_object(object)?;
        tables.client_objects.insert(object.id, object.clone());
        Ok(Some(object.clone()))
    }

    async fn soft_delete_client_object(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = tables.open_orders(OrderLink::Object(id))
            || tables.equipment_at(Placement::ClientObject(id)) > 0;
        Ok(soft_delete_row(&mut tables.client_objects, id, blocked))
    }

    async fn restore_client_object(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.client_objects, id) else {
            return Ok(false);
        };
        Tables::require(&tables.clients, row.client_id, "clients")?;
        tables.check_client_object(&row)?;
        tables.client_objects.insert(id, row);
        Ok(true)
    }

    async fn client_object_name_taken(
        &self,
        client_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.client_objects)
            .any(|o| o.client_id == client_id && o.name == name && Some(o.id) != exclude);
        Ok(taken)
    }

    async fn count_active_client_objects(&self, client_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = active_rows(&tables.client_objects)
            .filter(|o| o.client_id == client_id)
            .count() as i64;
        Ok(count)
    }
}

#[async_trait]
impl WarehouseStore for InMemoryStore {
    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Warehouse> {
        let mut tables = self.tables.write().await;
        tables.check_warehouse(warehouse)?;
        tables.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse.clone())
    }

    async fn get_warehouse(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Warehouse>> {
        Ok(get_row(&self.tables.read().await.warehouses, id, visibility))
    }

    async fn list_warehouses(&self, visibility: Visibility) -> StoreResult<Vec<Warehouse>> {
        Ok(list_rows(&self.tables.read().await.warehouses, visibility))
    }

    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Option<Warehouse>> {
        let mut tables = self.tables.write().await;
        if get_row(&tables.warehouses, warehouse.id, Visibility::ActiveOnly).is_none() {
            return Ok(None);
        }
        tables.check_warehouse(warehouse)?;
        tables.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(Some(warehouse.clone()))
    }

    async fn soft_delete_warehouse(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = tables.equipment_at(Placement::Warehouse(id)) > 0;
        Ok(soft_delete_row(&mut tables.warehouses, id, blocked))
    }

    async fn restore_warehouse(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.warehouses, id) else {
            return Ok(false);
        };
        tables.check_warehouse(&row)?;
        tables.warehouses.insert(id, row);
        Ok(true)
    }

    async fn warehouse_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.warehouses).any(|w| w.name == name && Some(w.id) != exclude);
        Ok(taken)
    }
}

#[async_trait]
impl DriverStore for InMemoryStore {
    async fn insert_driver(&self, driver: &Driver) -> StoreResult<Driver> {
        let mut tables = self.tables.write().await;
        tables.check_driver(driver)?;
        tables.drivers.insert(driver.id, driver.clone());
        Ok(driver.clone())
    }

    async fn get_driver(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Driver>> {
        Ok(get_row(&self.tables.read().await.drivers, id, visibility))
    }

    async fn list_drivers(&self, visibility: Visibility) -> StoreResult<Vec<Driver>> {
        Ok(list_rows(&self.tables.read().await.drivers, visibility))
    }

    async fn update_driver(&self, driver: &Driver) -> StoreResult<Option<Driver>> {
        let mut tables = self.tables.write().await;
        if get_row(&tables.drivers, driver.id, Visibility::ActiveOnly).is_none() {
            return Ok(None);
        }
        tables.check_driver(driver)?;
        tables.drivers.insert(driver.id, driver.clone());
        Ok(Some(driver.clone()))
    }

    async fn soft_delete_driver(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = active_rows(&tables.transports).any(|t| t.current_driver_id == Some(id))
            || tables.open_orders(OrderLink::Driver(id));
        Ok(soft_delete_row(&mut tables.drivers, id, blocked))
    }

    async fn restore_driver(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.drivers, id) else {
            return Ok(false);
        };
        tables.check_driver(&row)?;
        tables.drivers.insert(id, row);
        Ok(true)
    }

    async fn license_taken(&self, license_number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.drivers)
            .any(|d| d.license_number == license_number && Some(d.id) != exclude);
        Ok(taken)
    }
}

#[async_trait]
impl TransportStore for InMemoryStore {
    async fn insert_transport(&self, transport: &Transport) -> StoreResult<Transport> {
        let mut tables = self.tables.write().await;
        tables.check_transport(transport)?;
        tables.transports.insert(transport.id, transport.clone());
        Ok(transport.clone())
    }

    async fn get_transport(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Transport>> {
        Ok(get_row(&self.tables.read().await.transports, id, visibility))
    }

    async fn list_transports(&self, visibility: Visibility) -> StoreResult<Vec<Transport>> {
        Ok(list_rows(&self.tables.read().await.transports, visibility))
    }

    async fn update_transport(&self, transport: &Transport) -> StoreResult<Option<Transport>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = get_row(&tables.transports, transport.id, Visibility::ActiveOnly) else {
            return Ok(None);
        };
        let row = Transport {
            current_driver_id: stored.current_driver_id,
            current_equipment_id: stored.current_equipment_id,
            ..transport.clone()
        };
        tables.check_transport(&row)?;
        tables.transports.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn soft_delete_transport(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = match tables.transports.get(&id) {
            Some(t) => t.current_driver_id.is_some() || t.current_equipment_id.is_some(),
            None => false,
        } || tables.open_orders(OrderLink::Transport(id));
        Ok(soft_delete_row(&mut tables.transports, id, blocked))
    }

    async fn restore_transport(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.transports, id) else {
            return Ok(false);
        };
        tables.check_transport(&row)?;
        tables.transports.insert(id, row);
        Ok(true)
    }

    async fn plate_taken(&self, plate_number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.transports)
            .any(|t| t.plate_number == plate_number && Some(t.id) != exclude);
        Ok(taken)
    }

    async fn find_transport_by_driver(&self, driver_id: Uuid) -> StoreResult<Option<Transport>> {
        let tables = self.tables.read().await;
        let found = active_rows(&tables.transports)
            .find(|t| t.current_driver_id == Some(driver_id))
            .cloned();
        Ok(found)
    }

    async fn find_transport_by_equipment(&self, equipment_id: Uuid) -> StoreResult<Option<Transport>> {
        let tables = self.tables.read().await;
        let found = active_rows(&tables.transports)
            .find(|t| t.current_equipment_id == Some(equipment_id))
            .cloned();
        Ok(found)
    }

    async fn set_current_driver(
        &self,
        transport_id: Uuid,
        driver_id: Option<Uuid>,
    ) -> StoreResult<Option<Transport>> {
        let mut tables = self.tables.write().await;
        let Some(mut row) = get_row(&tables.transports, transport_id, Visibility::ActiveOnly) else {
            return Ok(None);
        };
        if let Some(driver_id) = driver_id {
            Tables::require(&tables.drivers, driver_id, "drivers")?;
        }
        row.current_driver_id = driver_id;
        row.updated_at = Utc::now();
        tables.check_transport(&row)?;
        tables.transports.insert(transport_id, row.clone());
        Ok(Some(row))
    }

    async fn attach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let mut transport = get_row(&tables.transports, transport_id, Visibility::ActiveOnly)
            .filter(|t| t.current_equipment_id.is_none())
            .ok_or(StoreError::NoRowsAffected("transports"))?;
        let mut equipment = get_row(&tables.equipment, equipment_id, Visibility::ActiveOnly)
            .filter(Equipment::is_available)
            .ok_or(StoreError::NoRowsAffected("equipment"))?;

        transport.current_equipment_id = Some(equipment_id);
        transport.updated_at = now;
        equipment.set_placement(Placement::Transport(transport_id));
        equipment.updated_at = now;

        // Ambas filas se validan antes de escribir cualquiera
        tables.check_transport(&transport)?;
        tables.check_equipment(&equipment)?;
        tables.transports.insert(transport_id, transport.clone());
        tables.equipment.insert(equipment_id, equipment);
        Ok(transport)
    }

    async fn detach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let mut transport = get_row(&tables.transports, transport_id, Visibility::ActiveOnly)
            .filter(|t| t.current_equipment_id == Some(equipment_id))
            .ok_or(StoreError::NoRowsAffected("transports"))?;
        let mut equipment = get_row(&tables.equipment, equipment_id, Visibility::ActiveOnly)
            .filter(|e| e.transport_id == Some(transport_id))
            .ok_or(StoreError::NoRowsAffected("equipment"))?;

        transport.current_equipment_id = None;
        transport.updated_at = now;
        equipment.set_placement(Placement::Unplaced);
        equipment.updated_at = now;

        tables.transports.insert(transport_id, transport.clone());
        tables.equipment.insert(equipment_id, equipment);
        Ok(transport)
    }
}

#[async_trait]
impl EquipmentStore for InMemoryStore {
    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<Equipment> {
        let mut tables = self.tables.write().await;
        tables.check_equipment_refs(equipment)?;
        tables.check_equipment(equipment)?;
        tables.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment.clone())
    }

    async fn get_equipment(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Equipment>> {
        Ok(get_row(&self.tables.read().await.equipment, id, visibility))
    }

    async fn list_equipment(&self, visibility: Visibility) -> StoreResult<Vec<Equipment>> {
        Ok(list_rows(&self.tables.read().await.equipment, visibility))
    }

    async fn update_equipment(&self, equipment: &Equipment) -> StoreResult<Option<Equipment>> {
        let mut tables = self.tables.write().await;
        let unchanged_mount = get_row(&tables.equipment, equipment.id, Visibility::ActiveOnly)
            .map(|stored| stored.transport_id == equipment.transport_id)
            .unwrap_or(false);
        if !unchanged_mount {
            return Ok(None);
        }
        tables.check_equipment_refs(equipment)?;
        tables.check_equipment(equipment)?;
        tables.equipment.insert(equipment.id, equipment.clone());
        Ok(Some(equipment.clone()))
    }

    async fn soft_delete_equipment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let blocked = tables
            .equipment
            .get(&id)
            .map(|e| e.transport_id.is_some())
            .unwrap_or(false);
        Ok(soft_delete_row(&mut tables.equipment, id, blocked))
    }

    async fn restore_equipment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.equipment, id) else {
            return Ok(false);
        };
        tables.check_equipment_refs(&row)?;
        tables.check_equipment(&row)?;
        tables.equipment.insert(id, row);
        Ok(true)
    }

    async fn equipment_number_taken(&self, number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        let taken = active_rows(&tables.equipment)
            .any(|e| e.number.as_deref() == Some(number) && Some(e.id) != exclude);
        Ok(taken)
    }

    async fn count_equipment_at(&self, placement: Placement) -> StoreResult<i64> {
        Ok(self.tables.read().await.equipment_at(placement))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<Order> {
        let mut tables = self.tables.write().await;
        tables.check_order_refs(order)?;
        tables.orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn get_order(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Order>> {
        Ok(get_row(&self.tables.read().await.orders, id, visibility))
    }

    async fn list_orders(&self, visibility: Visibility) -> StoreResult<Vec<Order>> {
        Ok(list_rows(&self.tables.read().await.orders, visibility))
    }

    async fn update_order(&self, order: &Order, expected_status: OrderStatus) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        let unchanged_status = get_row(&tables.orders, order.id, Visibility::ActiveOnly)
            .map(|stored| stored.status == expected_status)
            .unwrap_or(false);
        if !unchanged_status {
            return Ok(None);
        }
        tables.check_order_refs(order)?;
        tables.orders.insert(order.id, order.clone());
        Ok(Some(order.clone()))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        match tables.orders.get_mut(&id) {
            Some(order) if order.is_active() && order.status == from => {
                order.status = to;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(soft_delete_row(&mut tables.orders, id, false))
    }

    async fn restore_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = restore_candidate(&tables.orders, id) else {
            return Ok(false);
        };
        tables.check_order_refs(&row)?;
        tables.orders.insert(id, row);
        Ok(true)
    }

    async fn count_orders(&self, link: OrderLink, statuses: &[OrderStatus]) -> StoreResult<i64> {
        Ok(self.tables.read().await.count_orders(link, statuses))
    }
}
