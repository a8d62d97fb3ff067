use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use eventforge_core::{TableData, Value};

use crate::dataset::PublishStep;
use crate::errors::GenerationError;
use crate::model::{SinkAction, SinkReport};
use crate::output::{commit, temp_path};

/// One `<table>.csv` per table in a directory, skip-if-exists unless forced.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    force: bool,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            dir: dir.into(),
            force,
        }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    pub fn publish(&self, plan: &[PublishStep]) -> Result<SinkReport, GenerationError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut report = SinkReport::new("csv");
        let mut written = BTreeSet::new();
        let mut bytes_written = 0_u64;

        for step in plan {
            match step {
                PublishStep::Insert(table) => {
                    let path = self.path_for(table.name);
                    let existed = path.exists();
                    if existed && !self.force {
                        info!(table = table.name, path = %path.display(), "csv exists, skipping");
                        report.record(table.name, SinkAction::Skipped, 0);
                        continue;
                    }
                    bytes_written += write_table_csv(&path, table)?;
                    written.insert(table.name);
                    let action = if existed {
                        SinkAction::Overwritten
                    } else {
                        SinkAction::Written
                    };
                    report.record(table.name, action, table.len() as u64);
                    info!(table = table.name, rows = table.len(), "csv written");
                }
                PublishStep::ReconcileTickets { table, sales } => {
                    // A ticket file kept from an earlier run is left untouched.
                    if !written.contains(table.name) {
                        continue;
                    }
                    bytes_written += write_table_csv(&self.path_for(table.name), table)?;
                    report.record(table.name, SinkAction::Reconciled, sales.len() as u64);
                    info!(table = table.name, tickets = sales.len(), "csv reconciled");
                }
            }
        }

        report.bytes_written = Some(bytes_written);
        Ok(report)
    }
}

/// Write a table as CSV: header row, then one line per record with the key
/// column first. A failed write leaves neither the temp file nor a partial
/// `path` behind.
pub fn write_table_csv(path: &Path, table: &TableData) -> Result<u64, GenerationError> {
    let tmp_path = temp_path(path);
    let written = write_records(&tmp_path, table)
        .and_then(|bytes| commit(&tmp_path, path).map(|()| bytes).map_err(Into::into));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    written
}

fn write_records(tmp_path: &Path, table: &TableData) -> Result<u64, GenerationError> {
    let counting = CountingWriter::new(BufWriter::new(File::create(tmp_path)?));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(table.header())?;
    for row in &table.rows {
        let record: Vec<String> = row
            .key
            .map(|key| key.to_string())
            .into_iter()
            .chain(row.values.iter().map(Value::to_csv))
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use eventforge_core::Row;

    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eventforge_csv_{label}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn failed_write_removes_the_temp_file() {
        let dir = temp_dir("ragged");
        let path = dir.join("tickets.csv");
        let table = TableData {
            name: "tickets",
            key_column: Some("ticket_id"),
            columns: &["event_id", "quantity_sold"],
            rows: vec![Row {
                key: Some(1),
                values: vec![Value::Int(4)],
            }],
        };

        let result = write_table_csv(&path, &table);

        assert!(matches!(result, Err(GenerationError::Csv(_))));
        assert!(!path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn write_reports_bytes_and_commits() {
        let dir = temp_dir("ok");
        let path = dir.join("tickets.csv");
        let table = TableData {
            name: "tickets",
            key_column: Some("ticket_id"),
            columns: &["event_id", "quantity_sold"],
            rows: vec![Row {
                key: Some(1),
                values: vec![Value::Int(2), Value::Int(5)],
            }],
        };

        let bytes = write_table_csv(&path, &table).expect("write csv");

        let text = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(text, "ticket_id,event_id,quantity_sold\n1,2,5\n");
        assert_eq!(bytes, text.len() as u64);
        assert!(!temp_path(&path).exists());
    }
}
