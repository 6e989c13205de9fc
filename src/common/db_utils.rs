// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;

// ---
// Helper de leitura consistente
// ---
/// Abre uma transação somente leitura em REPEATABLE READ: todas as consultas de
/// um painel enxergam o mesmo instante do banco.
pub(crate) async fn begin_read_snapshot(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
