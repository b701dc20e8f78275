//! Registro de equipos y cambios de ubicación
//!
//! La ubicación en un transporte sólo se alcanza con `AssignmentService`;
//! aquí se gestionan objeto de cliente y almacén.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::validators::{
    ensure_placement_change_allowed, require_active_equipment, require_placement_target,
};
use super::Stores;
use crate::dto::equipment_dto::{CreateEquipmentRequest, UpdateEquipmentRequest};
use crate::models::{Equipment, Placement};
use crate::repositories::{ClientObjectStore, EquipmentStore, Visibility, WarehouseStore};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};
use crate::utils::patch::Patch;

/// Ubicación resultante de un request de actualización.
///
/// Informar una ubicación mueve el equipo allí; informar las dos es una
/// contradicción. Con sólo `null`s se limpian las columnas indicadas.
pub fn next_placement(current: &Equipment, request: &UpdateEquipmentRequest) -> AppResult<Placement> {
    match (&request.client_object_id, &request.warehouse_id) {
        (Patch::Set(_), Patch::Set(_)) => Placement::from_fields(
            request.client_object_id.as_set().copied(),
            request.warehouse_id.as_set().copied(),
            None,
        ),
        (Patch::Set(id), _) => Ok(Placement::ClientObject(*id)),
        (_, Patch::Set(id)) => Ok(Placement::Warehouse(*id)),
        (co, wh) => Placement::from_fields(
            co.clone().apply_to(current.client_object_id),
            wh.clone().apply_to(current.warehouse_id),
            current.transport_id,
        ),
    }
}

pub struct EquipmentService {
    equipment: Arc<dyn EquipmentStore>,
    client_objects: Arc<dyn ClientObjectStore>,
    warehouses: Arc<dyn WarehouseStore>,
}

impl EquipmentService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            equipment: stores.equipment.clone(),
            client_objects: stores.client_objects.clone(),
            warehouses: stores.warehouses.clone(),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_equipment(&self, request: CreateEquipmentRequest) -> AppResult<Equipment> {
        request.validate()?;
        let placement = Placement::from_fields(request.client_object_id, request.warehouse_id, None)?;
        require_placement_target(self.client_objects.as_ref(), self.warehouses.as_ref(), placement).await?;

        if let Some(number) = &request.number {
            if self.equipment.equipment_number_taken(number, None).await? {
                return Err(conflict_error("Equipment", "number", number));
            }
        }

        let now = Utc::now();
        let mut equipment = Equipment {
            id: Uuid::new_v4(),
            kind: request.kind,
            condition: request.condition,
            volume: request.volume,
            number: request.number,
            client_object_id: None,
            warehouse_id: None,
            transport_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        equipment.set_placement(placement);

        let created = self.equipment.insert_equipment(&equipment).await?;
        info!("🧰 Equipo {} creado ({:?})", created.id, placement);
        Ok(created)
    }

    pub async fn get_equipment(&self, id: Uuid, visibility: Visibility) -> AppResult<Equipment> {
        self.equipment
            .get_equipment(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Equipment", id))
    }

    pub async fn list_equipment(&self, visibility: Visibility) -> AppResult<Vec<Equipment>> {
        Ok(self.equipment.list_equipment(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_equipment(&self, id: Uuid, request: UpdateEquipmentRequest) -> AppResult<Equipment> {
        request.validate()?;
        let current = require_active_equipment(self.equipment.as_ref(), id).await?;
        let mut next = current.clone();

        if request.touches_placement() {
            let placement = next_placement(&current, &request)?;
            if placement != current.placement()? {
                ensure_placement_change_allowed(&current, placement)?;
                require_placement_target(self.client_objects.as_ref(), self.warehouses.as_ref(), placement)
                    .await?;
                next.set_placement(placement);
            }
        }

        if let Patch::Set(number) = &request.number {
            if current.number.as_ref() != Some(number)
                && self.equipment.equipment_number_taken(number, Some(id)).await?
            {
                return Err(conflict_error("Equipment", "number", number));
            }
        }
        next.number = request.number.apply_to(next.number);
        if let Some(kind) = request.kind {
            next.kind = kind;
        }
        if let Some(condition) = request.condition {
            next.condition = condition;
        }
        if let Some(volume) = request.volume {
            next.volume = volume;
        }

        if next == current {
            return Ok(current);
        }
        next.updated_at = Utc::now();

        match self.equipment.update_equipment(&next).await? {
            Some(updated) => {
                info!("✏️ Equipo {} actualizado", id);
                Ok(updated)
            }
            None => match self.equipment.get_equipment(id, Visibility::ActiveOnly).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "equipment '{}' was assigned to a transport concurrently",
                    id
                ))),
                None => Err(not_found_error("Equipment", id)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ErrorKind;
    use rust_decimal::Decimal;

    fn equipment_at(placement: Placement) -> Equipment {
        let now = Utc::now();
        let mut eq = Equipment {
            id: Uuid::new_v4(),
            kind: "pallet".into(),
            condition: "new".into(),
            volume: Decimal::new(2, 0),
            number: None,
            client_object_id: None,
            warehouse_id: None,
            transport_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        eq.set_placement(placement);
        eq
    }

    #[test]
    fn test_setting_one_location_moves_the_unit() {
        let warehouse = Uuid::new_v4();
        let object = Uuid::new_v4();
        let eq = equipment_at(Placement::Warehouse(warehouse));

        let request = UpdateEquipmentRequest {
            client_object_id: Patch::Set(object),
            ..Default::default()
        };
        assert_eq!(next_placement(&eq, &request).unwrap(), Placement::ClientObject(object));
    }

    #[test]
    fn test_both_locations_is_a_validation_error() {
        let eq = equipment_at(Placement::Unplaced);
        let request = UpdateEquipmentRequest {
            client_object_id: Patch::Set(Uuid::new_v4()),
            warehouse_id: Patch::Set(Uuid::new_v4()),
            ..Default::default()
        };
        let err = next_placement(&eq, &request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_null_clears_only_the_named_location() {
        let warehouse = Uuid::new_v4();
        let eq = equipment_at(Placement::Warehouse(warehouse));

        let clear_object = UpdateEquipmentRequest {
            client_object_id: Patch::Clear,
            ..Default::default()
        };
        assert_eq!(next_placement(&eq, &clear_object).unwrap(), Placement::Warehouse(warehouse));

        let clear_warehouse = UpdateEquipmentRequest {
            warehouse_id: Patch::Clear,
            ..Default::default()
        };
        assert_eq!(next_placement(&eq, &clear_warehouse).unwrap(), Placement::Unplaced);
    }
}
