use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use eventforge_core::{Record, User, Value};
use eventforge_generate::{PublishStep, SinkAction, SinkReport};

use crate::error::StoreResult;
use crate::store::Store;

/// Load a publication plan into a store.
///
/// An already populated store (users present) is left alone unless `force`
/// is set. Forced runs replace every populated table, clearing and inserting
/// it in one transaction. Ticket sales are written back only when the ticket
/// table was inserted in this run.
pub async fn publish_dataset<S: Store + ?Sized>(
    store: &mut S,
    plan: &[PublishStep],
    force: bool,
) -> StoreResult<SinkReport> {
    let mut report = SinkReport::new(store.engine());

    if !force && store.count_rows(User::TABLE).await? > 0 {
        info!(engine = store.engine(), "store already populated, skipping");
        for step in plan {
            if let PublishStep::Insert(table) = step {
                report.record(table.name, SinkAction::Skipped, 0);
            }
        }
        return Ok(report);
    }

    // Counted before any table is replaced: a cascading clear empties child
    // tables that were populated when the run started.
    let mut existing = BTreeMap::new();
    for step in plan {
        if let PublishStep::Insert(table) = step {
            existing.insert(table.name, store.count_rows(table.name).await?);
        }
    }

    let mut inserted = BTreeSet::new();
    for step in plan {
        match step {
            PublishStep::Insert(table) => {
                let populated = existing.get(table.name).copied().unwrap_or(0);
                let (action, rows) = if populated == 0 {
                    (SinkAction::Written, store.bulk_insert(table).await?)
                } else if force {
                    (SinkAction::Overwritten, store.replace_table(table).await?)
                } else {
                    warn!(table = table.name, rows = populated, "table already populated, skipping");
                    report.record(table.name, SinkAction::Skipped, 0);
                    continue;
                };
                inserted.insert(table.name);
                report.record(table.name, action, rows);
                info!(table = table.name, rows, "table inserted");
            }
            PublishStep::ReconcileTickets { table, sales } => {
                let Some(key_column) = table.key_column else {
                    continue;
                };
                if !inserted.contains(table.name) {
                    info!(table = table.name, "tickets kept from an earlier load, not reconciled");
                    continue;
                }
                for sale in sales {
                    store
                        .update_row(
                            table.name,
                            key_column,
                            i64::from(sale.ticket_id),
                            "quantity_sold",
                            &Value::from(sale.quantity_sold),
                        )
                        .await?;
                }
                report.record(table.name, SinkAction::Reconciled, sales.len() as u64);
                info!(table = table.name, tickets = sales.len(), "ticket sales reconciled");
            }
        }
    }

    Ok(report)
}
