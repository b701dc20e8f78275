use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::pg::{self, LockMode};
use super::{OrderStore, StoreResult, Visibility};
use crate::models::{Order, OrderLink, OrderStatus};

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Mantiene activas las filas referenciadas hasta el commit
async fn lock_references(conn: &mut PgConnection, order: &Order) -> StoreResult<()> {
    pg::lock_active(conn, "clients", order.client_id, LockMode::Share).await?;
    pg::lock_active(conn, "client_objects", order.object_id, LockMode::Share).await?;
    if let Some(transport_id) = order.transport_id {
        pg::lock_active(conn, "transports", transport_id, LockMode::Share).await?;
    }
    if let Some(driver_id) = order.driver_id {
        pg::lock_active(conn, "drivers", driver_id, LockMode::Share).await?;
    }
    Ok(())
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert_order(&self, order: &Order) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;
        lock_references(&mut tx, order).await?;

        let row = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, client_id, object_id, transport_id, driver_id, status, priority,
                comment, planned_at, created_by, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NULL)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.client_id)
        .bind(order.object_id)
        .bind(order.transport_id)
        .bind(order.driver_id)
        .bind(order.status)
        .bind(order.priority)
        .bind(&order.comment)
        .bind(order.planned_at)
        .bind(order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get_order(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Order>> {
        pg::fetch_by_id(&self.pool, "orders", id, visibility).await
    }

    async fn list_orders(&self, visibility: Visibility) -> StoreResult<Vec<Order>> {
        pg::fetch_all(&self.pool, "orders", visibility).await
    }

    async fn update_order(&self, order: &Order, expected_status: OrderStatus) -> StoreResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;
        lock_references(&mut tx, order).await?;

        let row = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET client_id = $2, object_id = $3, transport_id = $4, driver_id = $5,
                status = $6, priority = $7, comment = $8, planned_at = $9, updated_at = $10
            WHERE id = $1 AND deleted_at IS NULL AND status = $11
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.client_id)
        .bind(order.object_id)
        .bind(order.transport_id)
        .bind(order.driver_id)
        .bind(order.status)
        .bind(order.priority)
        .bind(&order.comment)
        .bind(order.planned_at)
        .bind(order.updated_at)
        .bind(expected_status)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_order(&self, id: Uuid) -> StoreResult<bool> {
        pg::guarded_soft_delete(&self.pool, "orders", id, "").await
    }

    async fn restore_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = pg::lock_deleted::<Order>(&mut tx, "orders", id).await? else {
            return Ok(false);
        };
        lock_references(&mut tx, &order).await?;

        let restored = pg::restore_in(&mut tx, "orders", id).await?;
        tx.commit().await?;
        Ok(restored)
    }

    async fn count_orders(&self, link: OrderLink, statuses: &[OrderStatus]) -> StoreResult<i64> {
        let labels: Vec<&str> = statuses.iter().map(|s| s.db_label()).collect();
        let sql = format!(
            "SELECT COUNT(*) FROM orders WHERE {} = $1 AND deleted_at IS NULL AND status::text = ANY($2)",
            link.column()
        );

        let result: (i64,) = sqlx::query_as(&sql)
            .bind(link.id())
            .bind(labels)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}
