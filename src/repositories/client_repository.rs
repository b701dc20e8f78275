//! Repositorios de clientes, objetos de cliente y almacenes

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::pg::{self, LockMode, OPEN_ORDER_STATUSES};
use super::{ClientObjectStore, ClientStore, StoreResult, Visibility, WarehouseStore};
use crate::models::{Client, ClientObject, Warehouse};

pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for ClientRepository {
    async fn insert_client(&self, client: &Client) -> StoreResult<Client> {
        let row = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, name, phone, email, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.created_at)
        .bind(client.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_client(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Client>> {
        pg::fetch_by_id(&self.pool, "clients", id, visibility).await
    }

    async fn list_clients(&self, visibility: Visibility) -> StoreResult<Vec<Client>> {
        pg::fetch_all(&self.pool, "clients", visibility).await
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Option<Client>> {
        let row = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, phone = $3, email = $4, updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_client(&self, id: Uuid) -> StoreResult<bool> {
        let guard = format!(
            " AND NOT EXISTS (SELECT 1 FROM client_objects o WHERE o.client_id = $1 AND o.deleted_at IS NULL) \
              AND NOT EXISTS (SELECT 1 FROM orders r WHERE r.client_id = $1 AND r.deleted_at IS NULL AND r.status IN {})",
            OPEN_ORDER_STATUSES
        );
        pg::guarded_soft_delete(&self.pool, "clients", id, &guard).await
    }

    async fn restore_client(&self, id: Uuid) -> StoreResult<bool> {
        pg::restore(&self.pool, "clients", id).await
    }

    async fn client_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE name = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}

pub struct ClientObjectRepository {
    pool: PgPool,
}

impl ClientObjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientObjectStore for ClientObjectRepository {
    async fn insert_client_object(&self, object: &ClientObject) -> StoreResult<ClientObject> {
        let mut tx = self.pool.begin().await?;
        pg::lock_active(&mut tx, "clients", object.client_id, LockMode::Share).await?;

        let row = sqlx::query_as::<_, ClientObject>(
            r#"
            INSERT INTO client_objects (id, client_id, name, address, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            RETURNING *
            "#,
        )
        .bind(object.id)
        .bind(object.client_id)
        .bind(&object.name)
        .bind(&object.address)
        .bind(object.created_at)
        .bind(object.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get_client_object(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<ClientObject>> {
        pg::fetch_by_id(&self.pool, "client_objects", id, visibility).await
    }

    async fn list_client_objects(&self, visibility: Visibility) -> StoreResult<Vec<ClientObject>> {
        pg::fetch_all(&self.pool, "client_objects", visibility).await
    }

    async fn update_client_object(&self, object: &ClientObject) -> StoreResult<Option<ClientObject>> {
        let mut tx = self.pool.begin().await?;
        pg::lock_active(&mut tx, "clients", object.client_id, LockMode::Share).await?;

        let row = sqlx::query_as::<_, ClientObject>(
            r#"
            UPDATE client_objects
            SET client_id = $2, name = $3, address = $4, updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(object.id)
        .bind(object.client_id)
        .bind(&object.name)
        .bind(&object.address)
        .bind(object.updated_at)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn soft_delete_client_object(&self, id: Uuid) -> StoreResult<bool> {
        let guard = format!(
            " AND NOT EXISTS (SELECT 1 FROM orders r WHERE r.object_id = $1 AND r.deleted_at IS NULL AND r.status IN {}) \
              AND NOT EXISTS (SELECT 1 FROM equipment e WHERE e.client_object_id = $1 AND e.deleted_at IS NULL)",
            OPEN_ORDER_STATUSES
        );
        pg::guarded_soft_delete(&self.pool, "client_objects", id, &guard).await
    }

    async fn restore_client_object(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let Some(object) = pg::lock_deleted::<ClientObject>(&mut tx, "client_objects", id).await? else {
            return Ok(false);
        };
        pg::lock_active(&mut tx, "clients", object.client_id, LockMode::Share).await?;

        let restored = pg::restore_in(&mut tx, "client_objects", id).await?;
        tx.commit().await?;
        Ok(restored)
    }

    async fn client_object_name_taken(
        &self,
        client_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM client_objects
                WHERE client_id = $1 AND name = $2 AND deleted_at IS NULL AND id IS DISTINCT FROM $3
            )
            "#,
        )
        .bind(client_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn count_active_client_objects(&self, client_id: Uuid) -> StoreResult<i64> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM client_objects WHERE client_id = $1 AND deleted_at IS NULL",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}

pub struct WarehouseRepository {
    pool: PgPool,
}

impl WarehouseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarehouseStore for WarehouseRepository {
    async fn insert_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Warehouse> {
        let row = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (id, name, address, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            RETURNING *
            "#,
        )
        .bind(warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.address)
        .bind(warehouse.created_at)
        .bind(warehouse.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_warehouse(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Warehouse>> {
        pg::fetch_by_id(&self.pool, "warehouses", id, visibility).await
    }

    async fn list_warehouses(&self, visibility: Visibility) -> StoreResult<Vec<Warehouse>> {
        pg::fetch_all(&self.pool, "warehouses", visibility).await
    }

    async fn update_warehouse(&self, warehouse: &Warehouse) -> StoreResult<Option<Warehouse>> {
        let row = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $2, address = $3, updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.address)
        .bind(warehouse.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_warehouse(&self, id: Uuid) -> StoreResult<bool> {
        let guard =
            " AND NOT EXISTS (SELECT 1 FROM equipment e WHERE e.warehouse_id = $1 AND e.deleted_at IS NULL)";
        pg::guarded_soft_delete(&self.pool, "warehouses", id, guard).await
    }

    async fn restore_warehouse(&self, id: Uuid) -> StoreResult<bool> {
        pg::restore(&self.pool, "warehouses", id).await
    }

    async fn warehouse_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE name = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
