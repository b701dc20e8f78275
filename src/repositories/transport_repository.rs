use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::pg::{self, LockMode, OPEN_ORDER_STATUSES};
use super::{StoreError, StoreResult, TransportStore, Visibility};
use crate::models::Transport;

pub struct TransportRepository {
    pool: PgPool,
}

impl TransportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_active_by(&self, column: &str, id: Uuid) -> StoreResult<Option<Transport>> {
        let sql = format!(
            "SELECT * FROM transports WHERE {} = $1 AND deleted_at IS NULL",
            column
        );
        let row = sqlx::query_as::<_, Transport>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl TransportStore for TransportRepository {
    async fn insert_transport(&self, transport: &Transport) -> StoreResult<Transport> {
        let row = sqlx::query_as::<_, Transport>(
            r#"
            INSERT INTO transports (
                id, plate_number, brand, model, capacity, status,
                current_driver_id, current_equipment_id, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL, $7, $8, NULL)
            RETURNING *
            "#,
        )
        .bind(transport.id)
        .bind(&transport.plate_number)
        .bind(&transport.brand)
        .bind(&transport.model)
        .bind(transport.capacity)
        .bind(transport.status)
        .bind(transport.created_at)
        .bind(transport.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_transport(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Transport>> {
        pg::fetch_by_id(&self.pool, "transports", id, visibility).await
    }

    async fn list_transports(&self, visibility: Visibility) -> StoreResult<Vec<Transport>> {
        pg::fetch_all(&self.pool, "transports", visibility).await
    }

    async fn update_transport(&self, transport: &Transport) -> StoreResult<Option<Transport>> {
        let row = sqlx::query_as::<_, Transport>(
            r#"
            UPDATE transports
            SET plate_number = $2, brand = $3, model = $4, capacity = $5, status = $6, updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(transport.id)
        .bind(&transport.plate_number)
        .bind(&transport.brand)
        .bind(&transport.model)
        .bind(transport.capacity)
        .bind(transport.status)
        .bind(transport.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_transport(&self, id: Uuid) -> StoreResult<bool> {
        let guard = format!(
            " AND current_driver_id IS NULL AND current_equipment_id IS NULL \
              AND NOT EXISTS (SELECT 1 FROM orders r WHERE r.transport_id = $1 AND r.deleted_at IS NULL AND r.status IN {})",
            OPEN_ORDER_STATUSES
        );
        pg::guarded_soft_delete(&self.pool, "transports", id, &guard).await
    }

    async fn restore_transport(&self, id: Uuid) -> StoreResult<bool> {
        pg::restore(&self.pool, "transports", id).await
    }

    async fn plate_taken(&self, plate_number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM transports WHERE plate_number = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(plate_number)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn find_transport_by_driver(&self, driver_id: Uuid) -> StoreResult<Option<Transport>> {
        self.find_active_by("current_driver_id", driver_id).await
    }

    async fn find_transport_by_equipment(&self, equipment_id: Uuid) -> StoreResult<Option<Transport>> {
        self.find_active_by("current_equipment_id", equipment_id).await
    }

    async fn set_current_driver(
        &self,
        transport_id: Uuid,
        driver_id: Option<Uuid>,
    ) -> StoreResult<Option<Transport>> {
        let mut tx = self.pool.begin().await?;

        // Asignaciones concurrentes del mismo conductor esperan aquí; la
        // segunda choca después con transports_current_driver_uniq.
        if let Some(driver_id) = driver_id {
            pg::lock_active(&mut tx, "drivers", driver_id, LockMode::Update).await?;
        }

        let row = sqlx::query_as::<_, Transport>(
            r#"
            UPDATE transports
            SET current_driver_id = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(transport_id)
        .bind(driver_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn attach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport> {
        let mut tx = self.pool.begin().await?;
        pg::lock_active(&mut tx, "transports", transport_id, LockMode::Update).await?;
        pg::lock_active(&mut tx, "equipment", equipment_id, LockMode::Update).await?;

        let transport = sqlx::query_as::<_, Transport>(
            r#"
            UPDATE transports
            SET current_equipment_id = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL AND current_equipment_id IS NULL
            RETURNING *
            "#,
        )
        .bind(transport_id)
        .bind(equipment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(transport) = transport else {
            tx.rollback().await?;
            return Err(StoreError::NoRowsAffected("transports"));
        };

        // El WHERE vuelve a exigir que el equipo esté libre dentro de la transacción
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET transport_id = $1, client_object_id = NULL, warehouse_id = NULL, updated_at = NOW()
            WHERE id = $2 AND deleted_at IS NULL
              AND transport_id IS NULL AND client_object_id IS NULL AND warehouse_id IS NULL
            "#,
        )
        .bind(transport_id)
        .bind(equipment_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NoRowsAffected("equipment"));
        }

        tx.commit().await?;
        Ok(transport)
    }

    async fn detach_equipment(&self, transport_id: Uuid, equipment_id: Uuid) -> StoreResult<Transport> {
        let mut tx = self.pool.begin().await?;

        let transport = sqlx::query_as::<_, Transport>(
            r#"
            UPDATE transports
            SET current_equipment_id = NULL, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL AND current_equipment_id = $2
            RETURNING *
            "#,
        )
        .bind(transport_id)
        .bind(equipment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(transport) = transport else {
            tx.rollback().await?;
            return Err(StoreError::NoRowsAffected("transports"));
        };

        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET transport_id = NULL, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL AND transport_id = $2
            "#,
        )
        .bind(equipment_id)
        .bind(transport_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NoRowsAffected("equipment"));
        }

        tx.commit().await?;
        Ok(transport)
    }
}
