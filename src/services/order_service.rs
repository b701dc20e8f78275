//! Servicio de pedidos
//!
//! Alta con validación referencial completa, actualización parcial de tres
//! estados por campo y cambios de estado sobre la máquina de estados de
//! `OrderStatus`. Toda escritura compara el estado leído con el almacenado.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::validators::{
    ensure_object_belongs_to_client, ensure_transport_working, require_active_client,
    require_active_client_object, require_active_driver, require_active_order,
    require_active_transport,
};
use super::Stores;
use crate::dto::order_dto::{CreateOrderRequest, UpdateOrderRequest};
use crate::models::{Order, OrderStatus};
use crate::repositories::{
    ClientObjectStore, ClientStore, DriverStore, OrderStore, TransportStore, Visibility,
};
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};
use crate::utils::patch::Patch;

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    clients: Arc<dyn ClientStore>,
    client_objects: Arc<dyn ClientObjectStore>,
    transports: Arc<dyn TransportStore>,
    drivers: Arc<dyn DriverStore>,
}

/// Valor nuevo de un campo obligatorio; `null` no está permitido
fn required<T>(patch: Patch<T>, field: &str) -> AppResult<Option<T>> {
    match patch {
        Patch::Keep => Ok(None),
        Patch::Clear => Err(validation_error(&format!("{} cannot be cleared", field))),
        Patch::Set(value) => Ok(Some(value)),
    }
}

impl OrderService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            orders: stores.orders.clone(),
            clients: stores.clients.clone(),
            client_objects: stores.client_objects.clone(),
            transports: stores.transports.clone(),
            drivers: stores.drivers.clone(),
        }
    }

    /// Transporte utilizable por un pedido: activo y en servicio
    async fn working_transport(&self, transport_id: Uuid) -> AppResult<()> {
        let transport = require_active_transport(self.transports.as_ref(), transport_id).await?;
        ensure_transport_working(&transport)
    }

    /// Crea un pedido en DRAFT
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn create_order(&self, created_by: Uuid, request: CreateOrderRequest) -> AppResult<Order> {
        request.validate()?;

        require_active_client(self.clients.as_ref(), request.client_id).await?;
        let object = require_active_client_object(self.client_objects.as_ref(), request.object_id).await?;
        ensure_object_belongs_to_client(&object, request.client_id)?;
        if let Some(transport_id) = request.transport_id {
            self.working_transport(transport_id).await?;
        }
        if let Some(driver_id) = request.driver_id {
            require_active_driver(self.drivers.as_ref(), driver_id).await?;
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            object_id: request.object_id,
            transport_id: request.transport_id,
            driver_id: request.driver_id,
            status: OrderStatus::Draft,
            priority: request.priority,
            comment: request.comment,
            planned_at: request.planned_at,
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.orders.insert_order(&order).await?;
        info!("📦 Pedido {} creado para el cliente {}", created.id, created.client_id);
        Ok(created)
    }

    pub async fn get_order(&self, id: Uuid, visibility: Visibility) -> AppResult<Order> {
        self.orders
            .get_order(id, visibility)
            .await?
            .ok_or_else(|| not_found_error("Order", id))
    }

    pub async fn list_orders(&self, visibility: Visibility) -> AppResult<Vec<Order>> {
        Ok(self.orders.list_orders(visibility).await?)
    }

    /// Actualización parcial: sólo se validan los campos presentes
    #[instrument(skip(self, request))]
    pub async fn update_order(&self, id: Uuid, request: UpdateOrderRequest) -> AppResult<Order> {
        request.validate()?;
        let current = require_active_order(self.orders.as_ref(), id).await?;
        let mut next = current.clone();

        let new_client = required(request.client_id, "client_id")?;
        let new_object = required(request.object_id, "object_id")?;
        if let Some(client_id) = new_client {
            require_active_client(self.clients.as_ref(), client_id).await?;
            next.client_id = client_id;
        }
        if let Some(object_id) = new_object {
            next.object_id = object_id;
        }
        if new_client.is_some() || new_object.is_some() {
            let object = require_active_client_object(self.client_objects.as_ref(), next.object_id).await?;
            ensure_object_belongs_to_client(&object, next.client_id)?;
        }

        if let Patch::Set(transport_id) = request.transport_id {
            self.working_transport(transport_id).await?;
        }
        next.transport_id = request.transport_id.apply_to(next.transport_id);

        if let Patch::Set(driver_id) = request.driver_id {
            require_active_driver(self.drivers.as_ref(), driver_id).await?;
        }
        next.driver_id = request.driver_id.apply_to(next.driver_id);

        if let Some(status) = required(request.status, "status")? {
            if !current.status.can_transition_to(status) {
                warn!("🚫 Transición inválida {} → {} en pedido {}", current.status, status, id);
                return Err(AppError::InvalidStatusTransition {
                    from: current.status,
                    to: status,
                });
            }
            next.status = status;
        }
        if let Some(priority) = required(request.priority, "priority")? {
            next.priority = priority;
        }
        next.comment = request.comment.apply_to(next.comment);
        next.planned_at = request.planned_at.apply_to(next.planned_at);

        if next == current {
            return Ok(current);
        }
        next.updated_at = Utc::now();

        let updated = self.write_order(&next, current.status).await?;
        info!("✏️ Pedido {} actualizado", id);
        Ok(updated)
    }

    /// Cambia el estado validando la transición contra el estado actual.
    /// Pedir el estado actual devuelve el pedido sin escribir.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let current = require_active_order(self.orders.as_ref(), id).await?;
        if current.status == status {
            return Ok(current);
        }
        if !current.status.can_transition_to(status) {
            warn!("🚫 Transición inválida {} → {} en pedido {}", current.status, status, id);
            return Err(AppError::InvalidStatusTransition {
                from: current.status,
                to: status,
            });
        }

        match self.orders.update_order_status(id, current.status, status).await? {
            Some(updated) => {
                info!("🔄 Pedido {} pasa de {} a {}", id, current.status, status);
                Ok(updated)
            }
            None => Err(self.explain_lost_write(id).await),
        }
    }

    /// Asigna un transporte al pedido; sólo exige que ambos estén activos
    #[instrument(skip(self))]
    pub async fn assign_transport(&self, id: Uuid, transport_id: Uuid) -> AppResult<Order> {
        let current = require_active_order(self.orders.as_ref(), id).await?;
        require_active_transport(self.transports.as_ref(), transport_id).await?;

        if current.transport_id == Some(transport_id) {
            return Ok(current);
        }
        let mut next = current.clone();
        next.transport_id = Some(transport_id);
        next.updated_at = Utc::now();

        let updated = self.write_order(&next, current.status).await?;
        info!("🚚 Transporte {} asignado al pedido {}", transport_id, id);
        Ok(updated)
    }

    async fn write_order(&self, order: &Order, expected_status: OrderStatus) -> AppResult<Order> {
        match self.orders.update_order(order, expected_status).await? {
            Some(updated) => Ok(updated),
            None => Err(self.explain_lost_write(order.id).await),
        }
    }

    /// Una escritura condicionada que no aplicó: el pedido se borró o su
    /// estado cambió entre la lectura y la escritura
    async fn explain_lost_write(&self, id: Uuid) -> AppError {
        match self.orders.get_order(id, Visibility::ActiveOnly).await {
            Ok(Some(order)) => AppError::Conflict(format!(
                "order '{}' was modified concurrently (status is now {})",
                id, order.status
            )),
            Ok(None) => not_found_error("Order", id),
            Err(err) => err.into(),
        }
    }
}
