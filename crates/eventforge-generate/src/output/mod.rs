//! File sinks.

pub mod csv;
pub mod sql;

use std::path::{Path, PathBuf};

pub use self::csv::{CsvSink, write_table_csv};
pub use self::sql::{SqlScriptSink, render_sql_script};

/// Sibling path a file is written to before being renamed into place.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{file_name}.tmp"))
}

pub(crate) fn commit(tmp_path: &Path, path: &Path) -> std::io::Result<()> {
    std::fs::rename(tmp_path, path)
}

/// Write bytes through a temp file so readers never observe a partial file.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = temp_path(path);
    std::fs::write(&tmp_path, data)?;
    commit(&tmp_path, path)
}
