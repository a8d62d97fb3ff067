//! PostgreSQL store on a `sqlx` pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, warn};

use eventforge_core::{TableData, Value, redact_connection_string};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// Postgres accepts at most this many bind parameters per statement.
const BIND_LIMIT: usize = 65_535;

/// How connection establishment is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Connect, retrying with a fixed delay. Failing every attempt is fatal.
pub async fn connect_with_retry(url: &str, retry: RetryPolicy) -> StoreResult<PgStore> {
    let target = redact_connection_string(url).redacted;
    let attempts = retry.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
        {
            Ok(pool) => {
                info!(store = %target, attempt, "connected to store");
                return Ok(PgStore::new(pool));
            }
            Err(err) => {
                warn!(store = %target, attempt, attempts, error = %err, "store connection failed");
                last_error = err.to_string();
                if attempt < attempts {
                    tokio::time::sleep(retry.delay).await;
                }
            }
        }
    }

    Err(StoreError::ConnectionExhausted {
        attempts,
        last_error,
    })
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn bulk_insert(&mut self, table: &TableData) -> StoreResult<u64> {
        if table.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        insert_rows(&mut *tx, table).await?;
        tx.commit().await?;
        Ok(table.len() as u64)
    }

    async fn replace_table(&mut self, table: &TableData) -> StoreResult<u64> {
        let sql = format!(
            "TRUNCATE TABLE {} RESTART IDENTITY CASCADE",
            quote_ident(table.name)
        );
        let mut tx = self.pool.begin().await?;
        sqlx::query(&sql).execute(&mut *tx).await?;
        insert_rows(&mut *tx, table).await?;
        tx.commit().await?;
        Ok(table.len() as u64)
    }

    async fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let sql = format!(
            "UPDATE {} SET {} = $1 WHERE {} = $2",
            quote_ident(table),
            quote_ident(column),
            quote_ident(key_column)
        );
        let query = sqlx::query(&sql);
        let query = match value {
            Value::Null => query.bind(Option::<i64>::None),
            Value::Bool(value) => query.bind(*value),
            Value::Int(value) => query.bind(*value),
            Value::Float(value) => query.bind(*value),
            Value::Money(value) => query.bind(value.as_f64()),
            Value::Text(value) => query.bind(value.clone()),
            Value::Timestamp(value) => query.bind(*value),
        };
        let result = query.bind(key).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownRow {
                table: table.to_string(),
                key_column: key_column.to_string(),
                key,
            });
        }
        Ok(())
    }
}

/// Insert `table` in chunks that stay under the bind parameter limit.
async fn insert_rows(conn: &mut PgConnection, table: &TableData) -> StoreResult<()> {
    if table.is_empty() {
        return Ok(());
    }

    let columns = table
        .columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let rows_per_statement = (BIND_LIMIT / table.columns.len().max(1)).max(1);

    for chunk in table.rows.chunks(rows_per_statement) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({columns}) ",
            quote_ident(table.name)
        ));
        builder.push_values(chunk, |mut separated, row| {
            for value in &row.values {
                match value {
                    Value::Null => {
                        separated.push("NULL");
                    }
                    Value::Bool(value) => {
                        separated.push_bind(*value);
                    }
                    Value::Int(value) => {
                        separated.push_bind(*value);
                    }
                    Value::Float(value) => {
                        separated.push_bind(*value);
                    }
                    Value::Money(value) => {
                        separated.push_bind(value.as_f64());
                    }
                    Value::Text(value) => {
                        separated.push_bind(value.clone());
                    }
                    Value::Timestamp(value) => {
                        separated.push_bind(*value);
                    }
                }
            }
        });
        builder.build().execute(&mut *conn).await?;
        debug!(table = table.name, rows = chunk.len(), "insert batch executed");
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("tickets"), "\"tickets\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn default_retry_matches_five_attempts_five_seconds() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.attempts, 5);
        assert_eq!(retry.delay, Duration::from_secs(5));
    }
}
