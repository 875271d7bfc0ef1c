//! Append-only record of published releases.

mod error;

pub use error::LedgerError;

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

const HEADER: &str = "package_name,issue,version,timestamp\n";

/// One published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub package_name: String,
    /// Browser URL of the release request issue.
    pub issue: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{}\n",
            csv_field(&self.package_name),
            csv_field(&self.issue),
            csv_field(&self.version),
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Quotes a field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV ledger file. Appends are serialized so concurrent issue runs never
/// interleave rows.
pub struct CsvLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first if the file is new or empty.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be opened or written.
    pub async fn record(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().await;
        let io_error = |source| LedgerError::IoError {
            path: self.path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_error)?;

        let mut contents = String::new();
        if file.metadata().await.map_err(io_error)?.len() == 0 {
            contents.push_str(HEADER);
        }
        contents.push_str(&entry.to_csv_row());

        file.write_all(contents.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        debug!(package = %entry.package_name, version = %entry.version, "Recorded release");
        Ok(())
    }
}
