use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::pg::{self, LockMode};
use super::{EquipmentStore, StoreResult, Visibility};
use crate::models::{Equipment, Placement};

pub struct EquipmentRepository {
    pool: PgPool,
}

impl EquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Impide que el destino de la ubicación se borre mientras se escribe
async fn lock_placement_target(conn: &mut PgConnection, equipment: &Equipment) -> StoreResult<()> {
    if let Some(id) = equipment.client_object_id {
        pg::lock_active(conn, "client_objects", id, LockMode::Share).await?;
    }
    if let Some(id) = equipment.warehouse_id {
        pg::lock_active(conn, "warehouses", id, LockMode::Share).await?;
    }
    Ok(())
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<Equipment> {
        let mut tx = self.pool.begin().await?;
        lock_placement_target(&mut tx, equipment).await?;

        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                id, kind, condition, volume, number,
                client_object_id, warehouse_id, transport_id, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $8, $9, NULL)
            RETURNING *
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.kind)
        .bind(&equipment.condition)
        .bind(equipment.volume)
        .bind(&equipment.number)
        .bind(equipment.client_object_id)
        .bind(equipment.warehouse_id)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get_equipment(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Equipment>> {
        pg::fetch_by_id(&self.pool, "equipment", id, visibility).await
    }

    async fn list_equipment(&self, visibility: Visibility) -> StoreResult<Vec<Equipment>> {
        pg::fetch_all(&self.pool, "equipment", visibility).await
    }

    async fn update_equipment(&self, equipment: &Equipment) -> StoreResult<Option<Equipment>> {
        let mut tx = self.pool.begin().await?;
        lock_placement_target(&mut tx, equipment).await?;

        // transport_id sólo lo escriben attach/detach; aquí se exige que no haya cambiado
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET kind = $2, condition = $3, volume = $4, number = $5,
                client_object_id = $6, warehouse_id = $7, updated_at = $8
            WHERE id = $1 AND deleted_at IS NULL AND transport_id IS NOT DISTINCT FROM $9
            RETURNING *
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.kind)
        .bind(&equipment.condition)
        .bind(equipment.volume)
        .bind(&equipment.number)
        .bind(equipment.client_object_id)
        .bind(equipment.warehouse_id)
        .bind(equipment.updated_at)
        .bind(equipment.transport_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn soft_delete_equipment(&self, id: Uuid) -> StoreResult<bool> {
        pg::guarded_soft_delete(&self.pool, "equipment", id, " AND transport_id IS NULL").await
    }

    async fn restore_equipment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let Some(equipment) = pg::lock_deleted::<Equipment>(&mut tx, "equipment", id).await? else {
            return Ok(false);
        };
        lock_placement_target(&mut tx, &equipment).await?;

        let restored = pg::restore_in(&mut tx, "equipment", id).await?;
        tx.commit().await?;
        Ok(restored)
    }

    async fn equipment_number_taken(&self, number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE number = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(number)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn count_equipment_at(&self, placement: Placement) -> StoreResult<i64> {
        let (condition, id) = match placement {
            Placement::Unplaced => (
                "client_object_id IS NULL AND warehouse_id IS NULL AND transport_id IS NULL",
                None,
            ),
            Placement::ClientObject(id) => ("client_object_id = $1", Some(id)),
            Placement::Warehouse(id) => ("warehouse_id = $1", Some(id)),
            Placement::Transport(id) => ("transport_id = $1", Some(id)),
        };
        let sql = format!(
            "SELECT COUNT(*) FROM equipment WHERE {} AND deleted_at IS NULL",
            condition
        );

        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let result = query.fetch_one(&self.pool).await?;

        Ok(result.0)
    }
}
