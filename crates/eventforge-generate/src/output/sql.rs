use std::fmt::Write as _;
use std::path::PathBuf;

use tracing::info;

use eventforge_core::{TIMESTAMP_FORMAT, TableData, Value};

use crate::dataset::PublishStep;
use crate::errors::GenerationError;
use crate::model::{SinkAction, SinkReport};
use crate::output::write_bytes_atomic;

/// A single SQL script holding the whole dataset in one transaction.
///
/// Inserts leave the key columns to the database sequences, matching how the
/// store sink loads tables, so the script must run against empty tables.
#[derive(Debug, Clone)]
pub struct SqlScriptSink {
    path: PathBuf,
    force: bool,
}

impl SqlScriptSink {
    pub fn new(path: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            path: path.into(),
            force,
        }
    }

    pub fn publish(&self, plan: &[PublishStep]) -> Result<SinkReport, GenerationError> {
        let mut report = SinkReport::new("sql");
        let existed = self.path.exists();
        if existed && !self.force {
            info!(path = %self.path.display(), "sql script exists, skipping");
            for step in plan {
                if let PublishStep::Insert(table) = step {
                    report.record(table.name, SinkAction::Skipped, 0);
                }
            }
            return Ok(report);
        }

        let script = render_sql_script(plan);
        write_bytes_atomic(&self.path, script.as_bytes())?;

        let insert_action = if existed {
            SinkAction::Overwritten
        } else {
            SinkAction::Written
        };
        for step in plan {
            match step {
                PublishStep::Insert(table) => {
                    report.record(table.name, insert_action, table.len() as u64)
                }
                PublishStep::ReconcileTickets { table, sales } => {
                    report.record(table.name, SinkAction::Reconciled, sales.len() as u64)
                }
            }
        }
        report.bytes_written = Some(script.len() as u64);
        info!(path = %self.path.display(), bytes = script.len(), "sql script written");
        Ok(report)
    }
}

pub fn render_sql_script(plan: &[PublishStep]) -> String {
    let mut script = String::new();
    script.push_str("-- eventforge dataset\n");
    script.push_str("SET TIME ZONE 'UTC';\n\n");
    script.push_str("BEGIN;\n\n");

    for step in plan {
        match step {
            PublishStep::Insert(table) => push_insert(&mut script, table),
            PublishStep::ReconcileTickets { table, sales } => {
                let key = table.key_column.unwrap_or("ticket_id");
                for sale in sales {
                    let _ = writeln!(
                        script,
                        "UPDATE {} SET quantity_sold = {} WHERE {key} = {};",
                        table.name, sale.quantity_sold, sale.ticket_id
                    );
                }
                script.push('\n');
            }
        }
    }

    script.push_str("COMMIT;\n");
    script
}

fn push_insert(script: &mut String, table: &TableData) {
    if table.is_empty() {
        return;
    }
    let _ = writeln!(
        script,
        "INSERT INTO {} ({}) VALUES",
        table.name,
        table.columns.join(", ")
    );
    let rows: Vec<String> = table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.values.iter().map(sql_literal).collect();
            format!("({})", cells.join(", "))
        })
        .collect();
    script.push_str(&rows.join(",\n"));
    script.push_str(";\n\n");
}

/// Render a cell as a SQL literal.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(value) => (if *value { "TRUE" } else { "FALSE" }).to_string(),
        Value::Int(value) => value.to_string(),
        Value::Float(value) => format!("{value:.6}"),
        Value::Money(value) => value.to_string(),
        Value::Text(value) => format!("'{}'", value.replace('\'', "''")),
        Value::Timestamp(value) => format!("'{}'", value.format(TIMESTAMP_FORMAT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_text_and_renders_null() {
        assert_eq!(sql_literal(&Value::from("O'Brien")), "'O''Brien'");
        assert_eq!(sql_literal(&Value::Null), "NULL");
        assert_eq!(
            sql_literal(&Value::Money(eventforge_core::Money::from_cents(5000))),
            "50.00"
        );
    }
}
