//! Recording doubles for external providers.

use pharmadesk_core::backup::SinkFuture;
use pharmadesk_core::notify::SendFuture;
use pharmadesk_core::{BackupSink, BackupTable, EmailMessage, EmailProvider, NotifyError, SinkError, SinkReceipt};
use std::sync::{Arc, Mutex, PoisonError};

/// Backup sink that keeps every exported table.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackupSink {
    exports: Arc<Mutex<Vec<BackupTable>>>,
    failure: Option<SinkError>,
}

impl RecordingBackupSink {
    /// A sink that accepts every export.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records the attempt, then fails with `error`.
    #[must_use]
    pub fn failing(error: SinkError) -> Self {
        Self {
            exports: Arc::default(),
            failure: Some(error),
        }
    }

    /// Tables passed to `export`, successful or not.
    #[must_use]
    pub fn exports(&self) -> Vec<BackupTable> {
        self.exports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `export` calls.
    #[must_use]
    pub fn export_count(&self) -> usize {
        self.exports.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl BackupSink for RecordingBackupSink {
    fn export(&self, table: BackupTable) -> SinkFuture<'_> {
        Box::pin(async move {
            let count = {
                let mut exports = self.exports.lock().unwrap_or_else(PoisonError::into_inner);
                exports.push(table);
                exports.len()
            };

            match &self.failure {
                Some(error) => Err(error.clone()),
                None => Ok(SinkReceipt {
                    spreadsheet_id: format!("sheet-{count}"),
                }),
            }
        })
    }
}

/// Email provider that keeps every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailProvider {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failure: Option<NotifyError>,
}

impl RecordingEmailProvider {
    /// A provider that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that records the attempt, then fails with `error`.
    #[must_use]
    pub fn failing(error: NotifyError) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(error),
        }
    }

    /// Messages passed to `send`.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EmailProvider for RecordingEmailProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.clone());

            match &self.failure {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        })
    }
}
