//! Borrado lógico y restauración
//!
//! Antes de borrar se calcula el conjunto completo de dependientes activos
//! que lo impiden; el rechazo los enumera todos. El almacén repite la guarda
//! dentro de la escritura, así que un dependiente creado entre la
//! comprobación y el borrado hace que el borrado no afecte filas.
//!
//! Restaurar exige que la fila esté borrada, que su clave natural siga libre
//! entre las filas activas y que sus referencias sigan activas.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::validators::{
    require_active_client, require_active_client_object, require_active_driver,
    require_active_equipment, require_active_transport, require_active_warehouse,
    require_placement_target,
};
use super::Stores;
use crate::models::{
    Client, ClientObject, Driver, Equipment, Order, OrderLink, OrderStatus, Placement, Transport,
    Warehouse,
};
use crate::repositories::Visibility;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

/// Motivos que bloquean el borrado de una fila
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSet {
    entity: &'static str,
    reasons: Vec<String>,
}

impl ConflictSet {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            reasons: Vec::new(),
        }
    }

    pub fn add_if(&mut self, blocked: bool, reason: impl Into<String>) {
        if blocked {
            self.reasons.push(reason.into());
        }
    }

    pub fn add_count(&mut self, count: i64, what: &str) {
        if count > 0 {
            self.reasons.push(format!("has {} {}", count, what));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.reasons.is_empty() {
            return Ok(());
        }
        Err(AppError::Conflict(format!(
            "cannot delete {}: {}",
            self.entity,
            self.reasons.join(", ")
        )))
    }
}

/// Error de un borrado que el almacén no aplicó
fn rejected_delete(entity: &'static str, id: Uuid, still_active: bool, conflicts: ConflictSet) -> AppError {
    if !still_active {
        return not_found_error(entity, id);
    }
    match conflicts.into_result() {
        Err(err) => err,
        Ok(()) => AppError::Conflict(format!("{} '{}' changed while being deleted", entity, id)),
    }
}

fn ensure_deleted(entity: &str, id: Uuid, deleted_at: Option<DateTime<Utc>>) -> AppResult<()> {
    if deleted_at.is_none() {
        return Err(AppError::Validation(format!("{} '{}' is not deleted", entity, id)));
    }
    Ok(())
}

pub struct LifecycleService {
    stores: Stores,
}

impl LifecycleService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    fn reject(conflicts: ConflictSet, id: Uuid) -> AppResult<()> {
        if !conflicts.is_empty() {
            warn!("🚫 Borrado de {} {} bloqueado: {:?}", conflicts.entity, id, conflicts.reasons());
        }
        conflicts.into_result()
    }

    // ---- conjuntos de conflictos ------------------------------------------

    pub async fn client_conflicts(&self, id: Uuid) -> AppResult<ConflictSet> {
        let mut conflicts = ConflictSet::new("client");
        let objects = self.stores.client_objects.count_active_client_objects(id).await?;
        conflicts.add_count(objects, "active client object(s)");
        let orders = self
            .stores
            .orders
            .count_orders(OrderLink::Client(id), &OrderStatus::BLOCKING)
            .await?;
        conflicts.add_count(orders, "open order(s)");
        Ok(conflicts)
    }

    pub async fn client_object_conflicts(&self, id: Uuid) -> AppResult<ConflictSet> {
        let mut conflicts = ConflictSet::new("client object");
        let orders = self
            .stores
            .orders
            .count_orders(OrderLink::Object(id), &OrderStatus::BLOCKING)
            .await?;
        conflicts.add_count(orders, "open order(s)");
        let equipment = self
            .stores
            .equipment
            .count_equipment_at(Placement::ClientObject(id))
            .await?;
        conflicts.add_count(equipment, "equipment unit(s) placed");
        Ok(conflicts)
    }

    pub async fn warehouse_conflicts(&self, id: Uuid) -> AppResult<ConflictSet> {
        let mut conflicts = ConflictSet::new("warehouse");
        let equipment = self
            .stores
            .equipment
            .count_equipment_at(Placement::Warehouse(id))
            .await?;
        conflicts.add_count(equipment, "equipment unit(s) stored");
        Ok(conflicts)
    }

    pub async fn transport_conflicts(&self, transport: &Transport) -> AppResult<ConflictSet> {
        let mut conflicts = ConflictSet::new("transport");
        conflicts.add_if(transport.current_driver_id.is_some(), "has an assigned driver");
        conflicts.add_if(transport.current_equipment_id.is_some(), "has assigned equipment");
        let orders = self
            .stores
            .orders
            .count_orders(OrderLink::Transport(transport.id), &OrderStatus::BLOCKING)
            .await?;
        conflicts.add_count(orders, "open order(s)");
        Ok(conflicts)
    }

    pub async fn driver_conflicts(&self, id: Uuid) -> AppResult<ConflictSet> {
        let mut conflicts = ConflictSet::new("driver");
        if let Some(transport) = self.stores.transports.find_transport_by_driver(id).await? {
            conflicts.add_if(true, format!("is assigned to transport {}", transport.plate_number));
        }
        let orders = self
            .stores
            .orders
            .count_orders(OrderLink::Driver(id), &OrderStatus::BLOCKING)
            .await?;
        conflicts.add_count(orders, "open order(s)");
        Ok(conflicts)
    }

    pub fn equipment_conflicts(equipment: &Equipment) -> ConflictSet {
        let mut conflicts = ConflictSet::new("equipment");
        if let Some(transport_id) = equipment.transport_id {
            conflicts.add_if(true, format!("is assigned to transport '{}'", transport_id));
        }
        conflicts
    }

    // ---- borrados ----------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.clients.as_ref();
        require_active_client(store, id).await?;
        Self::reject(self.client_conflicts(id).await?, id)?;

        if !store.soft_delete_client(id).await? {
            let still_active = store.get_client(id, Visibility::ActiveOnly).await?.is_some();
            return Err(rejected_delete("Client", id, still_active, self.client_conflicts(id).await?));
        }
        info!("🗑️ Cliente {} borrado", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_client_object(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.client_objects.as_ref();
        require_active_client_object(store, id).await?;
        Self::reject(self.client_object_conflicts(id).await?, id)?;

        if !store.soft_delete_client_object(id).await? {
            let still_active = store.get_client_object(id, Visibility::ActiveOnly).await?.is_some();
            let conflicts = self.client_object_conflicts(id).await?;
            return Err(rejected_delete("Client object", id, still_active, conflicts));
        }
        info!("🗑️ Objeto de cliente {} borrado", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.warehouses.as_ref();
        require_active_warehouse(store, id).await?;
        Self::reject(self.warehouse_conflicts(id).await?, id)?;

        if !store.soft_delete_warehouse(id).await? {
            let still_active = store.get_warehouse(id, Visibility::ActiveOnly).await?.is_some();
            let conflicts = self.warehouse_conflicts(id).await?;
            return Err(rejected_delete("Warehouse", id, still_active, conflicts));
        }
        info!("🗑️ Almacén {} borrado", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_transport(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.transports.as_ref();
        let transport = require_active_transport(store, id).await?;
        Self::reject(self.transport_conflicts(&transport).await?, id)?;

        if !store.soft_delete_transport(id).await? {
            return Err(match store.get_transport(id, Visibility::ActiveOnly).await? {
                Some(current) => {
                    rejected_delete("Transport", id, true, self.transport_conflicts(&current).await?)
                }
                None => not_found_error("Transport", id),
            });
        }
        info!("🗑️ Transporte {} borrado", transport.plate_number);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.drivers.as_ref();
        require_active_driver(store, id).await?;
        Self::reject(self.driver_conflicts(id).await?, id)?;

        if !store.soft_delete_driver(id).await? {
            let still_active = store.get_driver(id, Visibility::ActiveOnly).await?.is_some();
            return Err(rejected_delete("Driver", id, still_active, self.driver_conflicts(id).await?));
        }
        info!("🗑️ Conductor {} borrado", id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_equipment(&self, id: Uuid) -> AppResult<()> {
        let store = self.stores.equipment.as_ref();
        let equipment = require_active_equipment(store, id).await?;
        Self::reject(Self::equipment_conflicts(&equipment), id)?;

        if !store.soft_delete_equipment(id).await? {
            return Err(match store.get_equipment(id, Visibility::ActiveOnly).await? {
                Some(current) => rejected_delete("Equipment", id, true, Self::equipment_conflicts(&current)),
                None => not_found_error("Equipment", id),
            });
        }
        info!("🗑️ Equipo {} borrado", id);
        Ok(())
    }

    /// Los pedidos no tienen dependientes
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        if !self.stores.orders.soft_delete_order(id).await? {
            return Err(not_found_error("Order", id));
        }
        info!("🗑️ Pedido {} borrado", id);
        Ok(())
    }

    // ---- restauraciones ----------------------------------------------------

    #[instrument(skip(self))]
    pub async fn restore_client(&self, id: Uuid) -> AppResult<Client> {
        let store = self.stores.clients.as_ref();
        let row = store
            .get_client(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Client", id))?;
        ensure_deleted("Client", id, row.deleted_at)?;

        if store.client_name_taken(&row.name, Some(id)).await? {
            return Err(conflict_error("Client", "name", &row.name));
        }
        if !store.restore_client(id).await? {
            return Err(AppError::Validation(format!("Client '{}' is not deleted", id)));
        }

        info!("♻️ Cliente {} restaurado", row.name);
        require_active_client(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_client_object(&self, id: Uuid) -> AppResult<ClientObject> {
        let store = self.stores.client_objects.as_ref();
        let row = store
            .get_client_object(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Client object", id))?;
        ensure_deleted("Client object", id, row.deleted_at)?;

        require_active_client(self.stores.clients.as_ref(), row.client_id).await?;
        if store.client_object_name_taken(row.client_id, &row.name, Some(id)).await? {
            return Err(conflict_error("Client object", "name", &row.name));
        }
        if !store.restore_client_object(id).await? {
            return Err(AppError::Validation(format!("Client object '{}' is not deleted", id)));
        }

        info!("♻️ Objeto de cliente {} restaurado", row.name);
        require_active_client_object(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_warehouse(&self, id: Uuid) -> AppResult<Warehouse> {
        let store = self.stores.warehouses.as_ref();
        let row = store
            .get_warehouse(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Warehouse", id))?;
        ensure_deleted("Warehouse", id, row.deleted_at)?;

        if store.warehouse_name_taken(&row.name, Some(id)).await? {
            return Err(conflict_error("Warehouse", "name", &row.name));
        }
        if !store.restore_warehouse(id).await? {
            return Err(AppError::Validation(format!("Warehouse '{}' is not deleted", id)));
        }

        info!("♻️ Almacén {} restaurado", row.name);
        require_active_warehouse(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_transport(&self, id: Uuid) -> AppResult<Transport> {
        let store = self.stores.transports.as_ref();
        let row = store
            .get_transport(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Transport", id))?;
        ensure_deleted("Transport", id, row.deleted_at)?;

        if store.plate_taken(&row.plate_number, Some(id)).await? {
            return Err(conflict_error("Transport", "plate number", &row.plate_number));
        }
        if !store.restore_transport(id).await? {
            return Err(AppError::Validation(format!("Transport '{}' is not deleted", id)));
        }

        info!("♻️ Transporte {} restaurado", row.plate_number);
        require_active_transport(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_driver(&self, id: Uuid) -> AppResult<Driver> {
        let store = self.stores.drivers.as_ref();
        let row = store
            .get_driver(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))?;
        ensure_deleted("Driver", id, row.deleted_at)?;

        if store.license_taken(&row.license_number, Some(id)).await? {
            return Err(conflict_error("Driver", "license number", &row.license_number));
        }
        if !store.restore_driver(id).await? {
            return Err(AppError::Validation(format!("Driver '{}' is not deleted", id)));
        }

        info!("♻️ Conductor {} restaurado", row.full_name);
        require_active_driver(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_equipment(&self, id: Uuid) -> AppResult<Equipment> {
        let store = self.stores.equipment.as_ref();
        let row = store
            .get_equipment(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Equipment", id))?;
        ensure_deleted("Equipment", id, row.deleted_at)?;

        if let Some(number) = &row.number {
            if store.equipment_number_taken(number, Some(id)).await? {
                return Err(conflict_error("Equipment", "number", number));
            }
        }
        require_placement_target(
            self.stores.client_objects.as_ref(),
            self.stores.warehouses.as_ref(),
            row.placement()?,
        )
        .await?;
        if !store.restore_equipment(id).await? {
            return Err(AppError::Validation(format!("Equipment '{}' is not deleted", id)));
        }

        info!("♻️ Equipo {} restaurado", id);
        require_active_equipment(store, id).await
    }

    #[instrument(skip(self))]
    pub async fn restore_order(&self, id: Uuid) -> AppResult<Order> {
        let store = self.stores.orders.as_ref();
        let row = store
            .get_order(id, Visibility::IncludeDeleted)
            .await?
            .ok_or_else(|| not_found_error("Order", id))?;
        ensure_deleted("Order", id, row.deleted_at)?;

        require_active_client(self.stores.clients.as_ref(), row.client_id).await?;
        require_active_client_object(self.stores.client_objects.as_ref(), row.object_id).await?;
        if let Some(transport_id) = row.transport_id {
            require_active_transport(self.stores.transports.as_ref(), transport_id).await?;
        }
        if let Some(driver_id) = row.driver_id {
            require_active_driver(self.stores.drivers.as_ref(), driver_id).await?;
        }
        if !store.restore_order(id).await? {
            return Err(AppError::Validation(format!("Order '{}' is not deleted", id)));
        }

        info!("♻️ Pedido {} restaurado", id);
        store
            .get_order(id, Visibility::ActiveOnly)
            .await?
            .ok_or_else(|| not_found_error("Order", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ErrorKind;

    #[test]
    fn test_conflict_set_lists_every_reason() {
        let mut conflicts = ConflictSet::new("transport");
        conflicts.add_if(true, "has an assigned driver");
        conflicts.add_if(false, "has assigned equipment");
        conflicts.add_count(2, "open order(s)");
        conflicts.add_count(0, "ignored");

        let err = conflicts.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.to_string(),
            "Conflict: cannot delete transport: has an assigned driver, has 2 open order(s)"
        );
    }

    #[test]
    fn test_empty_conflict_set_allows_delete() {
        assert!(ConflictSet::new("warehouse").into_result().is_ok());
    }

    #[test]
    fn test_restore_requires_deleted_row() {
        let err = ensure_deleted("Driver", Uuid::new_v4(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(ensure_deleted("Driver", Uuid::new_v4(), Some(Utc::now())).is_ok());
    }
}
