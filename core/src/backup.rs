//! Backup Orchestrator.
//!
//! Reads every record from the store and exports it, as a single table, to an
//! external spreadsheet-like sink. One attempt per invocation: there is no
//! retry and no partial export bookkeeping.
//!
//! # Flow
//!
//! 1. **Authorize**: if a shared secret is configured, the caller's key must match
//! 2. **Read**: load all records from the store
//! 3. **Shape**: flatten records into a [`BackupTable`]
//! 4. **Export**: hand the table to the [`BackupSink`]
//!
//! Authorization failure stops the flow before step 2; nothing is read and
//! the sink is never called.

use crate::environment::Clock;
use crate::record::RequestRecord;
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Columns that lead every backup table.
pub const MANAGED_COLUMNS: [&str; 3] = ["id", "status", "updatedAt"];

/// Errors raised by a [`BackupSink`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink is missing a credential or target.
    #[error("Backup sink not configured: {0}")]
    NotConfigured(String),

    /// HTTP request failed before a response arrived.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The sink answered with an error status.
    #[error("Sink error (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error body returned by the sink
        message: String,
    },

    /// The sink's response could not be understood.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Identifier of the spreadsheet the sink wrote to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkReceipt {
    /// Spreadsheet identifier assigned by the sink.
    pub spreadsheet_id: String,
}

/// Boxed future returned by [`BackupSink::export`].
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<SinkReceipt, SinkError>> + Send + 'a>>;

/// Write-only destination for backup tables.
pub trait BackupSink: Send + Sync {
    /// Export one table.
    ///
    /// # Errors
    ///
    /// Any [`SinkError`]; the orchestrator reports it without retrying.
    fn export(&self, table: BackupTable) -> SinkFuture<'_>;
}

/// Records flattened into rows of text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTable {
    /// Spreadsheet title.
    pub title: String,
    /// Column names.
    pub header: Vec<String>,
    /// One row per record, aligned with `header`.
    pub rows: Vec<Vec<String>>,
}

impl BackupTable {
    /// Build a table from records.
    ///
    /// The header is `id, status, updatedAt` followed by the sorted union of
    /// every business field name. Missing fields become empty cells, strings
    /// are copied verbatim and other JSON values are written as compact JSON.
    #[must_use]
    pub fn from_records(records: &[RequestRecord], taken_at: DateTime<Utc>) -> Self {
        let extra: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.fields.keys().map(String::as_str))
            .filter(|name| !MANAGED_COLUMNS.contains(name))
            .collect();

        let header = MANAGED_COLUMNS
            .iter()
            .copied()
            .chain(extra.iter().copied())
            .map(str::to_string)
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                let mut row = vec![
                    record.id.to_string(),
                    record.status.to_string(),
                    record.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                ];
                row.extend(extra.iter().map(|name| cell(record.fields.get(*name))));
                row
            })
            .collect();

        Self {
            title: format!(
                "Pharmacy requests backup {}",
                taken_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            header,
            rows,
        }
    }

    /// Header followed by data rows.
    #[must_use]
    pub fn values(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Why a backup did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackupError {
    /// The presented API key is missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// Records could not be read.
    #[error("Failed to read requests: {0}")]
    Store(#[from] StoreError),

    /// The sink rejected or failed the export.
    #[error("Backup export failed: {reason}")]
    Export {
        /// Human-readable reason.
        reason: String,
    },
}

/// A completed backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupReport {
    /// Spreadsheet written by the sink.
    pub spreadsheet_id: String,
    /// Number of records exported.
    pub record_count: usize,
}

/// Runs backups from a store to a sink.
#[derive(Clone)]
pub struct BackupOrchestrator {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn BackupSink>,
    clock: Arc<dyn Clock>,
    api_key: Option<String>,
}

impl BackupOrchestrator {
    /// Create an orchestrator.
    ///
    /// `api_key` of `None` (or empty) disables the shared-secret check.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        sink: Arc<dyn BackupSink>,
        clock: Arc<dyn Clock>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            store,
            sink,
            clock,
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    /// Whether callers must present an API key.
    #[must_use]
    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check a presented key against the configured one in constant time.
    #[must_use]
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        match (&self.api_key, presented) {
            (None, _) => true,
            (Some(expected), Some(given)) => {
                constant_time_eq::constant_time_eq(expected.as_bytes(), given.as_bytes())
            }
            (Some(_), None) => false,
        }
    }

    /// Run one backup.
    ///
    /// # Errors
    ///
    /// - [`BackupError::Unauthorized`] before any I/O when the key check fails
    /// - [`BackupError::Store`] if records cannot be read
    /// - [`BackupError::Export`] if the sink fails
    pub async fn run(&self, presented_key: Option<&str>) -> Result<BackupReport, BackupError> {
        if !self.authorize(presented_key) {
            tracing::warn!(key_present = presented_key.is_some(), "Backup rejected: bad API key");
            metrics::counter!("pharmadesk_backups_total", "outcome" => "unauthorized").increment(1);
            return Err(BackupError::Unauthorized);
        }

        let records = self.store.list().await.inspect_err(|e| {
            tracing::error!(error = %e, "Backup failed reading requests");
            metrics::counter!("pharmadesk_backups_total", "outcome" => "failed").increment(1);
        })?;

        let table = BackupTable::from_records(&records, self.clock.now());
        let record_count = table.rows.len();

        match self.sink.export(table).await {
            Ok(receipt) => {
                metrics::counter!("pharmadesk_backups_total", "outcome" => "exported").increment(1);
                tracing::info!(
                    spreadsheet_id = %receipt.spreadsheet_id,
                    record_count,
                    "Backup exported"
                );
                Ok(BackupReport {
                    spreadsheet_id: receipt.spreadsheet_id,
                    record_count,
                })
            }
            Err(e) => {
                metrics::counter!("pharmadesk_backups_total", "outcome" => "failed").increment(1);
                tracing::error!(error = %e, "Backup export failed");
                Err(BackupError::Export {
                    reason: e.to_string(),
                })
            }
        }
    }
}
