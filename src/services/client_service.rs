//! Registro de clientes, objetos de cliente y almacenes

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::validators::{require_active_client, require_active_client_object, require_active_warehouse};
use super::Stores;
use crate::dto::client_dto::{
    CreateClientObjectRequest, CreateClientRequest, CreateWarehouseRequest,
    UpdateClientObjectRequest, UpdateClientRequest, UpdateWarehouseRequest,
};
use crate::models::{Client, ClientObject, Warehouse};
use crate::repositories::{ClientObjectStore, ClientStore, Visibility, WarehouseStore};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct ClientService {
    clients: Arc<dyn ClientStore>,
    client_objects: Arc<dyn ClientObjectStore>,
    warehouses: Arc<dyn WarehouseStore>,
}

impl ClientService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            clients: stores.clients.clone(),
            client_objects: stores.client_objects.clone(),
            warehouses: stores.warehouses.clone(),
        }
    }

    // ---- clients -----------------------------------------------------------

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_client(&self, request: CreateClientRequest) -> AppResult<Client> {
        request.validate()?;
        if self.clients.client_name_taken(&request.name, None).await? {
            return Err(conflict_error("Client", "name", &request.name));
        }

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: request.name,
            phone: request.phone,
            email: request.email,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.clients.insert_client(&client).await?;
        info!("🏢 Cliente {} creado", created.name);
        Ok(created)
    }

    pub async fn get_client(&self, id: Uuid, visibility: Visibility) -> AppResult<Client> {
        self.clients
            .get_client(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Client", id))
    }

    pub async fn list_clients(&self, visibility: Visibility) -> AppResult<Vec<Client>> {
        Ok(self.clients.list_clients(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_client(&self, id: Uuid, request: UpdateClientRequest) -> AppResult<Client> {
        request.validate()?;
        let mut client = require_active_client(self.clients.as_ref(), id).await?;

        if let Some(name) = request.name {
            if name != client.name && self.clients.client_name_taken(&name, Some(id)).await? {
                return Err(conflict_error("Client", "name", &name));
            }
            client.name = name;
        }
        client.phone = request.phone.apply_to(client.phone);
        client.email = request.email.apply_to(client.email);
        client.updated_at = Utc::now();

        self.clients
            .update_client(&client)
            .await?
            .ok_or_else(|| not_found_error("Client", id))
    }

    // ---- client objects ----------------------------------------------------

    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn create_client_object(&self, request: CreateClientObjectRequest) -> AppResult<ClientObject> {
        request.validate()?;
        require_active_client(self.clients.as_ref(), request.client_id).await?;
        if self
            .client_objects
            .client_object_name_taken(request.client_id, &request.name, None)
            .await?
        {
            return Err(conflict_error("Client object", "name", &request.name));
        }

        let now = Utc::now();
        let object = ClientObject {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            name: request.name,
            address: request.address,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.client_objects.insert_client_object(&object).await?;
        info!("📍 Objeto {} creado para el cliente {}", created.name, created.client_id);
        Ok(created)
    }

    pub async fn get_client_object(&self, id: Uuid, visibility: Visibility) -> AppResult<ClientObject> {
        self.client_objects
            .get_client_object(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Client object", id))
    }

    pub async fn list_client_objects(&self, visibility: Visibility) -> AppResult<Vec<ClientObject>> {
        Ok(self.client_objects.list_client_objects(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_client_object(
        &self,
        id: Uuid,
        request: UpdateClientObjectRequest,
    ) -> AppResult<ClientObject> {
        request.validate()?;
        let mut object = require_active_client_object(self.client_objects.as_ref(), id).await?;

        if let Some(name) = request.name {
            if name != object.name
                && self
                    .client_objects
                    .client_object_name_taken(object.client_id, &name, Some(id))
                    .await?
            {
                return Err(conflict_error("Client object", "name", &name));
            }
            object.name = name;
        }
        object.address = request.address.apply_to(object.address);
        object.updated_at = Utc::now();

        self.client_objects
            .update_client_object(&object)
            .await?
            .ok_or_else(|| not_found_error("Client object", id))
    }

    // ---- warehouses --------------------------------------------------------

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_warehouse(&self, request: CreateWarehouseRequest) -> AppResult<Warehouse> {
        request.validate()?;
        if self.warehouses.warehouse_name_taken(&request.name, None).await? {
            return Err(conflict_error("Warehouse", "name", &request.name));
        }

        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: request.name,
            address: request.address,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.warehouses.insert_warehouse(&warehouse).await?;
        info!("🏭 Almacén {} creado", created.name);
        Ok(created)
    }

    pub async fn get_warehouse(&self, id: Uuid, visibility: Visibility) -> AppResult<Warehouse> {
        self.warehouses
            .get_warehouse(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Warehouse", id))
    }

    pub async fn list_warehouses(&self, visibility: Visibility) -> AppResult<Vec<Warehouse>> {
        Ok(self.warehouses.list_warehouses(visibility).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_warehouse(&self, id: Uuid, request: UpdateWarehouseRequest) -> AppResult<Warehouse> {
        request.validate()?;
        let mut warehouse = require_active_warehouse(self.warehouses.as_ref(), id).await?;

        if let Some(name) = request.name {
            if name != warehouse.name && self.warehouses.warehouse_name_taken(&name, Some(id)).await? {
                return Err(conflict_error("Warehouse", "name", &name));
            }
            warehouse.name = name;
        }
        warehouse.address = request.address.apply_to(warehouse.address);
        warehouse.updated_at = Utc::now();

        self.warehouses
            .update_warehouse(&warehouse)
            .await?
            .ok_or_else(|| not_found_error("Warehouse", id))
    }
}
