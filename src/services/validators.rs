//! Validadores de consistencia entre entidades
//!
//! Funciones que deciden si una asignación o un borrado es legal dado el
//! estado actual del almacén. Las que sólo miran filas ya leídas son puras;
//! el resto hace una única lectura.

use uuid::Uuid;

use crate::models::{
    Client, ClientObject, Driver, Equipment, Order, Placement, Transport, Warehouse,
};
use crate::repositories::{
    ClientObjectStore, ClientStore, DriverStore, EquipmentStore, OrderStore, TransportStore,
    Visibility, WarehouseStore,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub async fn require_active_client(store: &dyn ClientStore, id: Uuid) -> AppResult<Client> {
    store
        .get_client(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Client", id))
}

pub async fn require_active_client_object(
    store: &dyn ClientObjectStore,
    id: Uuid,
) -> AppResult<ClientObject> {
    store
        .get_client_object(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Client object", id))
}

pub async fn require_active_warehouse(store: &dyn WarehouseStore, id: Uuid) -> AppResult<Warehouse> {
    store
        .get_warehouse(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Warehouse", id))
}

pub async fn require_active_driver(store: &dyn DriverStore, id: Uuid) -> AppResult<Driver> {
    store
        .get_driver(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Driver", id))
}

pub async fn require_active_transport(store: &dyn TransportStore, id: Uuid) -> AppResult<Transport> {
    store
        .get_transport(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Transport", id))
}

pub async fn require_active_equipment(store: &dyn EquipmentStore, id: Uuid) -> AppResult<Equipment> {
    store
        .get_equipment(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Equipment", id))
}

pub async fn require_active_order(store: &dyn OrderStore, id: Uuid) -> AppResult<Order> {
    store
        .get_order(id, Visibility::ActiveOnly)
        .await?
        .ok_or_else(|| not_found_error("Order", id))
}

/// El objeto de un pedido debe pertenecer al cliente del pedido
pub fn ensure_object_belongs_to_client(object: &ClientObject, client_id: Uuid) -> AppResult<()> {
    if object.client_id != client_id {
        return Err(AppError::Validation(format!(
            "client object '{}' does not belong to client '{}'",
            object.id, client_id
        )));
    }
    Ok(())
}

/// Sólo un transporte en servicio puede llevar pedidos nuevos
pub fn ensure_transport_working(transport: &Transport) -> AppResult<()> {
    if !transport.status.is_working() {
        return Err(AppError::Conflict(format!(
            "transport '{}' is not in working status",
            transport.plate_number
        )));
    }
    Ok(())
}

/// El conductor no puede ser el actual de otro transporte activo
pub async fn ensure_driver_free(
    transports: &dyn TransportStore,
    driver_id: Uuid,
    transport_id: Uuid,
) -> AppResult<()> {
    match transports.find_transport_by_driver(driver_id).await? {
        Some(other) if other.id != transport_id => Err(AppError::Conflict(format!(
            "driver already assigned to another transport ({})",
            other.plate_number
        ))),
        _ => Ok(()),
    }
}

/// Disponible = sin ninguna ubicación
pub fn ensure_equipment_available(equipment: &Equipment) -> AppResult<()> {
    if !equipment.is_available() {
        return Err(AppError::Conflict(format!(
            "equipment '{}' is not available for assignment",
            equipment.id
        )));
    }
    Ok(())
}

/// El equipo no puede ser el actual de otro transporte activo
pub async fn ensure_equipment_unmounted(
    transports: &dyn TransportStore,
    equipment_id: Uuid,
) -> AppResult<()> {
    if let Some(other) = transports.find_transport_by_equipment(equipment_id).await? {
        return Err(AppError::Conflict(format!(
            "equipment already assigned to another transport ({})",
            other.plate_number
        )));
    }
    Ok(())
}

/// Mientras está montado en un transporte la ubicación no se cambia
pub fn ensure_placement_change_allowed(current: &Equipment, next: Placement) -> AppResult<()> {
    match current.transport_id {
        Some(transport_id) if next != Placement::Transport(transport_id) => {
            Err(AppError::Conflict(format!(
                "equipment is assigned to transport '{}'; unassign it first",
                transport_id
            )))
        }
        _ => Ok(()),
    }
}

/// Comprueba que el destino de una ubicación existe y está activo
pub async fn require_placement_target(
    client_objects: &dyn ClientObjectStore,
    warehouses: &dyn WarehouseStore,
    placement: Placement,
) -> AppResult<()> {
    match placement {
        Placement::ClientObject(id) => {
            require_active_client_object(client_objects, id).await?;
        }
        Placement::Warehouse(id) => {
            require_active_warehouse(warehouses, id).await?;
        }
        Placement::Unplaced | Placement::Transport(_) => {}
    }
    Ok(())
}
