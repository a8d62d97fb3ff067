use async_trait::async_trait;

use eventforge_core::{TableData, Value};

use crate::error::StoreResult;

/// Trait implemented by persistent stores the dataset can be loaded into.
///
/// Inserts leave surrogate keys to the store, which numbers rows from 1 in
/// insertion order on an empty (or freshly cleared) table.
#[async_trait]
pub trait Store: Send {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64>;

    /// Insert every row of `table` in one transaction. Returns rows inserted.
    async fn bulk_insert(&mut self, table: &TableData) -> StoreResult<u64>;

    /// Remove every row of `table`, restart its key sequence and insert the
    /// new rows, all in one transaction. Returns rows inserted.
    async fn replace_table(&mut self, table: &TableData) -> StoreResult<u64>;

    /// Set one column of the row whose key column equals `key`.
    async fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()>;
}
