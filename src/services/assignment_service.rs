//! Orquestación de asignaciones
//!
//! Transporte↔conductor y transporte↔equipo. Las comprobaciones previas
//! dan errores claros; la exclusividad la garantiza el almacén al escribir
//! (índices únicos parciales y transacciones sobre ambas filas).

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::validators::{
    ensure_driver_free, ensure_equipment_available, ensure_equipment_unmounted,
    require_active_driver, require_active_equipment, require_active_transport,
};
use super::Stores;
use crate::models::Transport;
use crate::repositories::{DriverStore, EquipmentStore, StoreError, TransportStore, Visibility};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Debug, Clone, Copy)]
enum PairOp {
    Attach,
    Detach,
}

pub struct AssignmentService {
    transports: Arc<dyn TransportStore>,
    drivers: Arc<dyn DriverStore>,
    equipment: Arc<dyn EquipmentStore>,
}

impl AssignmentService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            transports: stores.transports.clone(),
            drivers: stores.drivers.clone(),
            equipment: stores.equipment.clone(),
        }
    }

    /// Asigna un conductor a un transporte.
    ///
    /// Reasignar el mismo conductor al mismo transporte es un no-op; si el
    /// transporte ya tenía otro conductor, se reemplaza.
    #[instrument(skip(self))]
    pub async fn assign_driver(&self, transport_id: Uuid, driver_id: Uuid) -> AppResult<Transport> {
        let transport = require_active_transport(self.transports.as_ref(), transport_id).await?;
        require_active_driver(self.drivers.as_ref(), driver_id).await?;

        if transport.current_driver_id == Some(driver_id) {
            return Ok(transport);
        }

        if let Err(err) = ensure_driver_free(self.transports.as_ref(), driver_id, transport_id).await {
            warn!("⚠️ Conductor {} ya asignado, rechazando asignación a {}", driver_id, transport_id);
            return Err(err);
        }

        let updated = self
            .transports
            .set_current_driver(transport_id, Some(driver_id))
            .await
            .map_err(|err| {
                if matches!(err, StoreError::UniqueViolation(_)) {
                    warn!("⚠️ Asignación concurrente del conductor {} rechazada por el almacén", driver_id);
                }
                AppError::from(err)
            })?
            .ok_or_else(|| not_found_error("Transport", transport_id))?;

        info!("✅ Conductor {} asignado al transporte {}", driver_id, updated.plate_number);
        Ok(updated)
    }

    /// Retira el conductor actual; sin conductor es un conflicto, no un no-op
    #[instrument(skip(self))]
    pub async fn unassign_driver(&self, transport_id: Uuid) -> AppResult<Transport> {
        let transport = require_active_transport(self.transports.as_ref(), transport_id).await?;
        let Some(driver_id) = transport.current_driver_id else {
            return Err(AppError::Conflict(format!(
                "transport '{}' has no driver to unassign",
                transport.plate_number
            )));
        };

        let updated = self
            .transports
            .set_current_driver(transport_id, None)
            .await?
            .ok_or_else(|| not_found_error("Transport", transport_id))?;

        info!("🔓 Conductor {} retirado del transporte {}", driver_id, updated.plate_number);
        Ok(updated)
    }

    /// Monta un equipo libre en un transporte sin equipo.
    ///
    /// Ambos punteros se escriben en una sola transacción.
    #[instrument(skip(self))]
    pub async fn assign_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> AppResult<Transport> {
        let transport = require_active_transport(self.transports.as_ref(), transport_id).await?;
        let equipment = require_active_equipment(self.equipment.as_ref(), equipment_id).await?;

        if let Some(current) = transport.current_equipment_id {
            return Err(AppError::Conflict(format!(
                "transport '{}' already carries equipment '{}'",
                transport.plate_number, current
            )));
        }
        ensure_equipment_available(&equipment)?;
        ensure_equipment_unmounted(self.transports.as_ref(), equipment_id).await?;

        match self.transports.attach_equipment(transport_id, equipment_id).await {
            Ok(updated) => {
                info!("✅ Equipo {} montado en el transporte {}", equipment_id, updated.plate_number);
                Ok(updated)
            }
            Err(StoreError::NoRowsAffected(table)) => {
                Err(self.classify_pair_failure(PairOp::Attach, transport_id, equipment_id, table).await)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Desmonta el equipo actual del transporte
    #[instrument(skip(self))]
    pub async fn unassign_equipment(&self, transport_id: Uuid) -> AppResult<Transport> {
        let transport = require_active_transport(self.transports.as_ref(), transport_id).await?;
        let Some(equipment_id) = transport.current_equipment_id else {
            return Err(AppError::Conflict(format!(
                "transport '{}' has no equipment to unassign",
                transport.plate_number
            )));
        };

        match self.transports.detach_equipment(transport_id, equipment_id).await {
            Ok(updated) => {
                info!("🔓 Equipo {} desmontado del transporte {}", equipment_id, updated.plate_number);
                Ok(updated)
            }
            Err(StoreError::NoRowsAffected(table)) => {
                Err(self.classify_pair_failure(PairOp::Detach, transport_id, equipment_id, table).await)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Una transacción de dos filas que no afectó filas se revirtió entera.
    /// Se relee el estado: fila ausente es NotFound, precondición ya no
    /// cumplida (otra petición ganó la carrera) es Conflict, lo demás Internal.
    async fn classify_pair_failure(
        &self,
        op: PairOp,
        transport_id: Uuid,
        equipment_id: Uuid,
        table: &'static str,
    ) -> AppError {
        let transport = match self.transports.get_transport(transport_id, Visibility::ActiveOnly).await {
            Ok(Some(transport)) => transport,
            Ok(None) => return not_found_error("Transport", transport_id),
            Err(err) => return err.into(),
        };
        let equipment = match self.equipment.get_equipment(equipment_id, Visibility::ActiveOnly).await {
            Ok(Some(equipment)) => equipment,
            Ok(None) => return not_found_error("Equipment", equipment_id),
            Err(err) => return err.into(),
        };

        let lost_race = match op {
            PairOp::Attach => transport.current_equipment_id.is_some() || !equipment.is_available(),
            PairOp::Detach => {
                transport.current_equipment_id != Some(equipment_id)
                    || equipment.transport_id != Some(transport_id)
            }
        };
        if lost_race {
            warn!("⚠️ Cambio concurrente sobre transporte {} / equipo {}", transport_id, equipment_id);
            return AppError::Conflict(format!(
                "transport '{}' or equipment '{}' changed concurrently",
                transport.plate_number, equipment_id
            ));
        }
        StoreError::NoRowsAffected(table).into()
    }
}
