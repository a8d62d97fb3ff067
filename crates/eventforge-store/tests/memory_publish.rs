use anyhow::{Context, Result};
use async_trait::async_trait;

use eventforge_core::{GenerationPolicy, Record, TableData, Ticket, User, Value};
use eventforge_generate::{DatasetGenerator, GenerationResult, PublishStep, SinkAction};
use eventforge_store::{MemoryStore, Store, StoreError, StoreResult, publish_dataset};

fn populated_tables(result: &GenerationResult) -> usize {
    result
        .dataset
        .table_sizes()
        .into_iter()
        .filter(|(_, rows)| *rows > 0)
        .count()
}

/// Memory store whose user table clear cascades to every other table, the
/// way `TRUNCATE ... CASCADE` does in Postgres.
struct CascadingStore {
    inner: MemoryStore,
    children: Vec<TableData>,
}

impl CascadingStore {
    fn new(plan: &[PublishStep]) -> Self {
        let children = plan
            .iter()
            .filter_map(|step| match step {
                PublishStep::Insert(table) if table.name != User::TABLE => Some(TableData {
                    name: table.name,
                    key_column: table.key_column,
                    columns: table.columns,
                    rows: Vec::new(),
                }),
                _ => None,
            })
            .collect();
        Self {
            inner: MemoryStore::new(),
            children,
        }
    }
}

#[async_trait]
impl Store for CascadingStore {
    fn engine(&self) -> &'static str {
        "cascading"
    }

    async fn count_rows(&mut self, table: &str) -> StoreResult<u64> {
        self.inner.count_rows(table).await
    }

    async fn bulk_insert(&mut self, table: &TableData) -> StoreResult<u64> {
        self.inner.bulk_insert(table).await
    }

    async fn replace_table(&mut self, table: &TableData) -> StoreResult<u64> {
        if table.name == User::TABLE {
            for child in &self.children {
                self.inner.replace_table(child).await?;
            }
        }
        self.inner.replace_table(table).await
    }

    async fn update_row(
        &mut self,
        table: &str,
        key_column: &str,
        key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()> {
        self.inner
            .update_row(table, key_column, key, column, value)
            .await
    }
}

fn generate() -> Result<GenerationResult> {
    let policy = GenerationPolicy {
        seed: 21,
        user_count: 200,
        venue_count: 4,
        event_count: 6,
        speaker_count: 10,
        sponsor_count: 5,
        registration_target: 800,
        ..GenerationPolicy::default()
    };
    DatasetGenerator::new(policy)
        .run()
        .context("generating dataset")
}

#[tokio::test]
async fn publishes_every_table_and_reconciles_tickets() -> Result<()> {
    let result = generate()?;
    let plan = result.dataset.publication_plan();
    let mut store = MemoryStore::new();

    let report = publish_dataset(&mut store, &plan, false).await?;

    assert_eq!(report.sink, "memory");
    assert_eq!(report.count(SinkAction::Written), 16);
    assert_eq!(report.count(SinkAction::Reconciled), 1);
    for (table, rows) in result.dataset.table_sizes() {
        assert_eq!(store.count_rows(table).await?, rows as u64, "{table}");
    }
    for ticket in &result.dataset.tickets {
        assert_eq!(
            store.cell("tickets", i64::from(ticket.id), "quantity_sold"),
            Some(&Value::Int(i64::from(ticket.quantity_sold)))
        );
    }
    Ok(())
}

#[tokio::test]
async fn populated_store_is_skipped_unless_forced() -> Result<()> {
    let result = generate()?;
    let plan = result.dataset.publication_plan();
    let mut store = MemoryStore::new();
    publish_dataset(&mut store, &plan, false).await?;

    let skipped = publish_dataset(&mut store, &plan, false).await?;
    assert_eq!(skipped.count(SinkAction::Skipped), 16);
    assert_eq!(store.count_rows("users").await?, 200);

    let forced = publish_dataset(&mut store, &plan, true).await?;
    assert_eq!(forced.count(SinkAction::Skipped), 0);
    let populated = populated_tables(&result);
    assert_eq!(forced.count(SinkAction::Overwritten), populated);
    assert_eq!(forced.count(SinkAction::Written), 16 - populated);
    assert_eq!(forced.count(SinkAction::Reconciled), 1);
    assert_eq!(store.count_rows("users").await?, 200);
    let first_ticket = store.rows("tickets").and_then(|rows| rows.first());
    assert_eq!(first_ticket.and_then(|row| row.key), Some(1));
    Ok(())
}

#[tokio::test]
async fn tickets_from_an_earlier_load_are_not_reconciled() -> Result<()> {
    let result = generate()?;
    let plan = result.dataset.publication_plan();
    let mut store = MemoryStore::new();
    let issued = TableData::from_records::<Ticket>(&result.dataset.issued_tickets());
    store.bulk_insert(&issued).await?;

    let report = publish_dataset(&mut store, &plan, false).await?;

    assert_eq!(report.count(SinkAction::Skipped), 1);
    assert_eq!(report.count(SinkAction::Reconciled), 0);
    assert_eq!(
        store.cell("tickets", 1, "quantity_sold"),
        Some(&Value::Int(0))
    );
    Ok(())
}

#[tokio::test]
async fn updating_a_missing_row_is_an_error() -> Result<()> {
    let mut store = MemoryStore::new();
    let err = store
        .update_row("tickets", "ticket_id", 1, "quantity_sold", &Value::Int(3))
        .await
        .expect_err("table does not exist");
    assert!(matches!(err, StoreError::UnknownTable(_)));
    Ok(())
}

#[tokio::test]
async fn cascading_clear_still_reports_children_as_overwritten() -> Result<()> {
    let result = generate()?;
    let plan = result.dataset.publication_plan();
    let mut store = CascadingStore::new(&plan);
    publish_dataset(&mut store, &plan, false).await?;

    let forced = publish_dataset(&mut store, &plan, true).await?;

    let populated = populated_tables(&result);
    assert_eq!(forced.count(SinkAction::Overwritten), populated);
    assert_eq!(forced.count(SinkAction::Written), 16 - populated);
    for (table, rows) in result.dataset.table_sizes() {
        assert_eq!(store.count_rows(table).await?, rows as u64, "{table}");
    }
    Ok(())
}

#[tokio::test]
async fn updating_an_unknown_column_is_an_error() -> Result<()> {
    let result = generate()?;
    let plan = result.dataset.publication_plan();
    let mut store = MemoryStore::new();
    publish_dataset(&mut store, &plan, false).await?;

    let err = store
        .update_row("tickets", "ticket_id", 1, "sold_out", &Value::Int(3))
        .await
        .expect_err("column does not exist");
    assert!(matches!(
        err,
        StoreError::UnknownColumn { ref table, ref column } if table == "tickets" && column == "sold_out"
    ));

    let err = store
        .update_row("tickets", "event_id", 1, "quantity_sold", &Value::Int(3))
        .await
        .expect_err("event_id is not the key column");
    assert!(matches!(err, StoreError::UnknownColumn { .. }));
    Ok(())
}
