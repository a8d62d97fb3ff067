use std::collections::BTreeMap;

use async_trait::async_trait;

use eventforge_core::{Row, TableData, Value};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    key_column: Option<String>,
    columns: Vec<String>,
    rows: Vec<Row>,
    next_key: i64,
}

/// Store kept in process memory. Keys are numbered like a serial column.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> Option<&[Row]> {
        self.tables.get(table).map(|table| table.rows.as_slice())
    }

    /// Cell `column` of the row keyed `key`.
    pub fn cell(&self, table: &str, key: i64, column: &str) -> Option<&Value> {
        let table = self.tables.get(table)?;
        let index = table.columns.iter().position(|name| name == column)?;
        table
            .rows
            .iter()
            .find(|row| row.key == Some(key))
            .and_then(|row| row.values.get(index))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64> {
        Ok(self
            .tables
            .get(table)
            .map(|table| table.rows.len() as u64)
            .unwrap_or(0))
    }

    async fn bulk_insert(&mut self, data: &TableData) -> StoreResult<u64> {
        let table = self.tables.entry(data.name.to_string()).or_default();
        table.key_column = data.key_column.map(str::to_string);
        table.columns = data.columns.iter().map(|name| name.to_string()).collect();
        for row in &data.rows {
            let key = match table.key_column {
                Some(_) => {
                    table.next_key += 1;
                    Some(table.next_key)
                }
                None => None,
            };
            table.rows.push(Row {
                key,
                values: row.values.clone(),
            });
        }
        Ok(data.len() as u64)
    }

    async fn replace_table(&mut self, data: &TableData) -> StoreResult<u64> {
        if let Some(table) = self.tables.get_mut(data.name) {
            table.rows.clear();
            table.next_key = 0;
        }
        self.bulk_insert(data).await
    }

    async fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let unknown_row = || StoreError::UnknownRow {
            table: table.to_string(),
            key_column: key_column.to_string(),
            key,
        };
        let data = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let unknown_column = |column: &str| StoreError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        };
        if data.key_column.as_deref() != Some(key_column) {
            return Err(unknown_column(key_column));
        }
        let index = data
            .columns
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| unknown_column(column))?;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.key == Some(key))
            .ok_or_else(unknown_row)?;
        if let Some(cell) = row.values.get_mut(index) {
            *cell = value.clone();
        }
        Ok(())
    }
}
