use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocator::{AllocationOutcome, RejectionStats};
use crate::errors::GenerationError;
use crate::output::write_bytes_atomic;

/// Rows generated for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
}

/// Registration allocator statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub target: u32,
    pub fulfilled: u64,
    pub attempts: u64,
    pub attempt_budget: u64,
    pub rejections: RejectionStats,
}

impl AllocationReport {
    pub fn from_outcome(outcome: &AllocationOutcome, attempt_budget: u64) -> Self {
        Self {
            target: outcome.target,
            fulfilled: outcome.registrations.len() as u64,
            attempts: outcome.attempts,
            attempt_budget,
            rejections: outcome.rejections,
        }
    }
}

/// What a sink did with one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkAction {
    Written,
    /// Destination already held data and the run was not forced.
    Skipped,
    /// Destination held data and was replaced because the run was forced.
    Overwritten,
    /// Sold quantities written back after allocation.
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOutcome {
    pub table: String,
    pub action: SinkAction,
    pub rows: u64,
}

/// Outcome of one sink (csv, sql script, store) for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReport {
    pub sink: String,
    pub tables: Vec<TableOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
}

impl SinkReport {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            tables: Vec::new(),
            bytes_written: None,
        }
    }

    pub fn record(&mut self, table: &str, action: SinkAction, rows: u64) {
        self.tables.push(TableOutcome {
            table: table.to_string(),
            action,
            rows,
        });
    }

    pub fn count(&self, action: SinkAction) -> usize {
        self.tables.iter().filter(|t| t.action == action).count()
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub tables: Vec<TableReport>,
    pub allocation: AllocationReport,
    pub duration_ms: u64,
    #[serde(default)]
    pub sinks: Vec<SinkReport>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            tables: Vec::new(),
            allocation: AllocationReport::default(),
            duration_ms: 0,
            sinks: Vec::new(),
        }
    }

    pub fn record_table(&mut self, table: &str, rows: usize) {
        self.tables.push(TableReport {
            table: table.to_string(),
            rows: rows as u64,
        });
    }

    pub fn rows_of(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|report| report.table == table)
            .map(|report| report.rows)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, GenerationError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Write the report as pretty JSON, replacing any earlier report at `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), GenerationError> {
        let data = self.to_json()?;
        write_bytes_atomic(path, &data)?;
        Ok(())
    }
}
