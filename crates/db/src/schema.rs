//! Idempotent bootstrap of the `quotes` table.

use crate::DbPool;

const CREATE_QUOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    author TEXT NOT NULL,
    quote TEXT NOT NULL
)";

const CREATE_AUTHOR_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_quotes_author ON quotes (author)";

pub async fn ensure(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_QUOTES_TABLE).execute(pool).await?;
    sqlx::query(CREATE_AUTHOR_INDEX).execute(pool).await?;
    Ok(())
}

pub async fn is_present(pool: &DbPool) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'quotes'",
    )
    .fetch_one(pool)
    .await?;

    Ok(count == 1)
}
