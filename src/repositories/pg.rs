//! Helpers comunes de los repositorios PostgreSQL
//!
//! Centraliza la visibilidad del borrado lógico, el bloqueo de filas
//! referenciadas y el ciclo borrado/restauración para todas las tablas.

use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{StoreError, StoreResult, Visibility};

/// Estados de pedido que bloquean borrados, en formato SQL
pub(crate) const OPEN_ORDER_STATUSES: &str = "('draft', 'scheduled', 'in_progress')";

#[derive(Debug, Clone, Copy)]
pub(crate) enum LockMode {
    /// Impide que la fila se borre mientras otra escritura la referencia
    Share,
    /// Serializa escrituras sobre la misma fila
    Update,
}

impl LockMode {
    fn clause(self) -> &'static str {
        match self {
            LockMode::Share => "FOR SHARE",
            LockMode::Update => "FOR UPDATE",
        }
    }
}

pub(crate) async fn fetch_by_id<T>(
    pool: &PgPool,
    table: &str,
    id: Uuid,
    visibility: Visibility,
) -> StoreResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = $1{}", table, visibility.sql_filter());
    let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row)
}

pub(crate) async fn fetch_all<T>(pool: &PgPool, table: &str, visibility: Visibility) -> StoreResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {} WHERE TRUE{} ORDER BY created_at DESC",
        table,
        visibility.sql_filter()
    );
    let rows = sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Bloquea una fila activa dentro de la transacción en curso
pub(crate) async fn lock_active(
    conn: &mut PgConnection,
    table: &'static str,
    id: Uuid,
    mode: LockMode,
) -> StoreResult<()> {
    let sql = format!(
        "SELECT id FROM {} WHERE id = $1 AND deleted_at IS NULL {}",
        table,
        mode.clause()
    );
    let row: Option<(Uuid,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.map(|_| ()).ok_or(StoreError::MissingReference(table))
}

/// Borrado lógico con guarda de dependientes.
///
/// La fila se bloquea primero con `FOR UPDATE`; las escrituras que la
/// referencian toman `FOR SHARE` sobre ella, así que la comprobación de
/// `guard` (que usa `$1` como id) ve todo lo que se haya confirmado antes.
pub(crate) async fn guarded_soft_delete(
    pool: &PgPool,
    table: &'static str,
    id: Uuid,
    guard: &str,
) -> StoreResult<bool> {
    let mut tx = pool.begin().await?;

    if let Err(err) = lock_active(&mut tx, table, id, LockMode::Update).await {
        return match err {
            StoreError::MissingReference(_) => Ok(false),
            other => Err(other),
        };
    }

    let sql = format!(
        "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL{}",
        table, guard
    );
    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Bloquea una fila borrada antes de restaurarla.
/// Devuelve `None` si la fila no existe o ya está activa.
pub(crate) async fn lock_deleted<T>(conn: &mut PgConnection, table: &str, id: Uuid) -> StoreResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {} WHERE id = $1 AND deleted_at IS NOT NULL FOR UPDATE",
        table
    );
    let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&mut *conn).await?;
    Ok(row)
}

/// Restaura una fila borrada; los índices parciales rechazan colisiones.
/// Quien la llame dentro de una transacción debe haber bloqueado antes
/// las filas padre con `LockMode::Share`.
pub(crate) async fn restore_in(conn: &mut PgConnection, table: &str, id: Uuid) -> StoreResult<bool> {
    let sql = format!(
        "UPDATE {} SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        table
    );
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Restauración de tablas sin filas padre
pub(crate) async fn restore(pool: &PgPool, table: &str, id: Uuid) -> StoreResult<bool> {
    let mut conn = pool.acquire().await?;
    restore_in(&mut conn, table, id).await
}
