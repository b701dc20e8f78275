//! Registro de transportes y conductores
//!
//! Los punteros de asignación de un transporte no se escriben aquí; van por
//! `AssignmentService`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::validators::{require_active_driver, require_active_transport};
use super::Stores;
use crate::dto::fleet_dto::{
    CreateDriverRequest, CreateTransportRequest, UpdateDriverRequest, UpdateTransportRequest,
};
use crate::models::{Driver, Transport};
use crate::repositories::{DriverStore, TransportStore, Visibility};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct FleetService {
    transports: Arc<dyn TransportStore>,
    drivers: Arc<dyn DriverStore>,
}

impl FleetService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            transports: stores.transports.clone(),
            drivers: stores.drivers.clone(),
        }
    }

    #[instrument(skip(self, request), fields(plate = %request.plate_number))]
    pub async fn create_transport(&self, request: CreateTransportRequest) -> AppResult<Transport> {
        request.validate()?;
        if self.transports.plate_taken(&request.plate_number, None).await? {
            return Err(conflict_error("Transport", "plate number", &request.plate_number));
        }

        let now = Utc::now();
        let transport = Transport {
            id: Uuid::new_v4(),
            plate_number: request.plate_number,
            brand: request.brand,
            model: request.model,
            capacity: request.capacity,
            status: request.status.unwrap_or_default(),
            current_driver_id: None,
            current_equipment_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.transports.insert_transport(&transport).await?;
        info!("🚚 Transporte {} registrado", created.plate_number);
        Ok(created)
    }

    pub async fn get_transport(&self, id: Uuid, visibility: Visibility) -> AppResult<Transport> {
        self.transports
            .get_transport(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Transport", id))
    }

    pub async fn list_transports(&self, visibility: Visibility) -> AppResult<Vec<Transport>> {
        Ok(self.transports.list_transports(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_transport(&self, id: Uuid, request: UpdateTransportRequest) -> AppResult<Transport> {
        request.validate()?;
        let mut transport = require_active_transport(self.transports.as_ref(), id).await?;

        if let Some(plate) = request.plate_number {
            if plate != transport.plate_number && self.transports.plate_taken(&plate, Some(id)).await? {
                return Err(conflict_error("Transport", "plate number", &plate));
            }
            transport.plate_number = plate;
        }
        transport.brand = request.brand.apply_to(transport.brand);
        transport.model = request.model.apply_to(transport.model);
        if let Some(capacity) = request.capacity {
            transport.capacity = capacity;
        }
        if let Some(status) = request.status {
            transport.status = status;
        }
        transport.updated_at = Utc::now();

        let updated = self
            .transports
            .update_transport(&transport)
            .await?
            .ok_or_else(|| not_found_error("Transport", id))?;
        info!("✏️ Transporte {} actualizado", updated.plate_number);
        Ok(updated)
    }

    #[instrument(skip(self, request), fields(license = %request.license_number))]
    pub async fn create_driver(&self, request: CreateDriverRequest) -> AppResult<Driver> {
        request.validate()?;
        if self.drivers.license_taken(&request.license_number, None).await? {
            return Err(conflict_error("Driver", "license number", &request.license_number));
        }

        let now = Utc::now();
        let driver = Driver {
            id: Uuid::new_v4(),
            full_name: request.full_name,
            license_number: request.license_number,
            license_classes: request.license_classes,
            phone: request.phone,
            email: request.email,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.drivers.insert_driver(&driver).await?;
        info!("👤 Conductor {} registrado", created.full_name);
        Ok(created)
    }

    pub async fn get_driver(&self, id: Uuid, visibility: Visibility) -> AppResult<Driver> {
        self.drivers
            .get_driver(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))
    }

    pub async fn list_drivers(&self, visibility: Visibility) -> AppResult<Vec<Driver>> {
        Ok(self.drivers.list_drivers(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_driver(&self, id: Uuid, request: UpdateDriverRequest) -> AppResult<Driver> {
        request.validate()?;
        let mut driver = require_active_driver(self.drivers.as_ref(), id).await?;

        if let Some(license) = request.license_number {
            if license != driver.license_number && self.drivers.license_taken(&license, Some(id)).await? {
                return Err(conflict_error("Driver", "license number", &license));
            }
            driver.license_number = license;
        }
        if let Some(full_name) = request.full_name {
            driver.full_name = full_name;
        }
        if let Some(classes) = request.license_classes {
            driver.license_classes = classes;
        }
        driver.phone = request.phone.apply_to(driver.phone);
        driver.email = request.email.apply_to(driver.email);
        driver.updated_at = Utc::now();

        self.drivers
            .update_driver(&driver)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))
    }
}
