//! Upload Receiver.
//!
//! Persists one binary payload under `<unix-millis>_<sanitized name>` in a
//! fixed directory and returns its public path. There is no size limit, no
//! content-type check and no scanning.

use crate::environment::Clock;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The uploads directory could not be created or the file written.
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
///
/// # Examples
///
/// ```
/// use pharmadesk_core::sanitize_filename;
///
/// assert_eq!(sanitize_filename("my file@2024!.pdf"), "my_file_2024_.pdf");
/// assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Storage name for an upload received at `at`.
#[must_use]
pub fn storage_name(original: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}", at.timestamp_millis(), sanitize_filename(original))
}

/// Result of a stored upload, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    /// Name the client sent.
    pub filename: String,
    /// Public path of the stored file.
    pub file_path: String,
    /// Time of upload.
    #[serde(serialize_with = "iso_millis")]
    pub upload_date: DateTime<Utc>,
}

fn iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Writes uploads to a directory.
#[derive(Clone)]
pub struct UploadReceiver {
    dir: PathBuf,
    public_prefix: String,
    clock: Arc<dyn Clock>,
}

impl UploadReceiver {
    /// Create a receiver writing into `dir` and reporting paths under `public_prefix`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let public_prefix: String = public_prefix.into();
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            clock,
        }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Path prefix returned in [`StoredUpload::file_path`], without a trailing `/`.
    #[must_use]
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Store `bytes` under a timestamped name derived from `original_name`.
    ///
    /// The directory is created on first use.
    ///
    /// # Errors
    ///
    /// [`UploadError::Io`] if the directory or file cannot be written.
    pub async fn receive(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        let at = self.clock.now();
        let stored = storage_name(original_name, at);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&stored), bytes).await?;

        metrics::counter!("pharmadesk_uploads_total").increment(1);
        tracing::info!(
            filename = %original_name,
            stored = %stored,
            bytes = bytes.len(),
            "Upload stored"
        );

        Ok(StoredUpload {
            filename: original_name.to_string(),
            file_path: format!("{}/{stored}", self.public_prefix),
            upload_date: at,
        })
    }
}
