use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::pg::{self, OPEN_ORDER_STATUSES};
use super::{DriverStore, StoreResult, Visibility};
use crate::models::Driver;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverStore for DriverRepository {
    async fn insert_driver(&self, driver: &Driver) -> StoreResult<Driver> {
        let row = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, full_name, license_number, license_classes, phone, email, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL)
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(&driver.full_name)
        .bind(&driver.license_number)
        .bind(&driver.license_classes)
        .bind(&driver.phone)
        .bind(&driver.email)
        .bind(driver.created_at)
        .bind(driver.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_driver(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Driver>> {
        pg::fetch_by_id(&self.pool, "drivers", id, visibility).await
    }

    async fn list_drivers(&self, visibility: Visibility) -> StoreResult<Vec<Driver>> {
        pg::fetch_all(&self.pool, "drivers", visibility).await
    }

    async fn update_driver(&self, driver: &Driver) -> StoreResult<Option<Driver>> {
        let row = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET full_name = $2, license_number = $3, license_classes = $4, phone = $5, email = $6, updated_at = $7
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(&driver.full_name)
        .bind(&driver.license_number)
        .bind(&driver.license_classes)
        .bind(&driver.phone)
        .bind(&driver.email)
        .bind(driver.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete_driver(&self, id: Uuid) -> StoreResult<bool> {
        let guard = format!(
            " AND NOT EXISTS (SELECT 1 FROM transports t WHERE t.current_driver_id = $1 AND t.deleted_at IS NULL) \
              AND NOT EXISTS (SELECT 1 FROM orders r WHERE r.driver_id = $1 AND r.deleted_at IS NULL AND r.status IN {})",
            OPEN_ORDER_STATUSES
        );
        pg::guarded_soft_delete(&self.pool, "drivers", id, &guard).await
    }

    async fn restore_driver(&self, id: Uuid) -> StoreResult<bool> {
        pg::restore(&self.pool, "drivers", id).await
    }

    async fn license_taken(&self, license_number: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM drivers WHERE license_number = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(license_number)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
