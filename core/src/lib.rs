//! # Pharmadesk Core
//!
//! Domain model and request workflows for the Pharmadesk pharmacy backend.
//!
//! This crate knows nothing about HTTP or SQL. It defines the request record,
//! the store accessor every mutating workflow goes through, and the four
//! workflows the public API exposes:
//!
//! - **Status transitions**: validate and apply a status change to one record
//! - **Backups**: read every record and export it to a spreadsheet sink
//! - **Notifications**: deliver a transactional email through a provider
//! - **Uploads**: persist one binary payload under a timestamped name
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ StatusTransition     │   │ BackupOrchestrator   │──▶ BackupSink
//! │ Handler              │   │ (read-only)          │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            │                          │
//!            ▼                          ▼
//!        ┌──────────────────────────────────┐
//!        │ RecordStore (document accessor)  │
//!        └──────────────────────────────────┘
//!
//! NotificationDispatcher ──▶ EmailProvider
//! UploadReceiver ──▶ filesystem
//! ```
//!
//! External collaborators are traits with boxed futures so the server can hold
//! them as `Arc<dyn Trait>`. Concrete implementations live in
//! `pharmadesk-postgres`, `pharmadesk-providers` and `pharmadesk-testing`.
//!
//! ## Example
//!
//! ```ignore
//! use pharmadesk_core::{StatusTransitionHandler, environment::SystemClock};
//!
//! let handler = StatusTransitionHandler::new(store, Arc::new(SystemClock));
//! let change = handler.apply("req-42", Some("in-progress")).await?;
//! assert_eq!(change.status, RequestStatus::InProgress);
//! ```

pub mod backup;
pub mod environment;
pub mod notify;
pub mod record;
pub mod status;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use backup::{BackupError, BackupOrchestrator, BackupReport, BackupSink, BackupTable, SinkError, SinkReceipt};
pub use chrono::{DateTime, Utc};
pub use environment::{Clock, SystemClock};
pub use notify::{EmailMessage, EmailProvider, NotificationDispatcher, NotifyError};
pub use record::{InvalidStatus, RequestId, RequestRecord, RequestStatus};
pub use status::{StatusChange, StatusTransitionHandler, TransitionError};
pub use store::{RecordStore, StoreError, StoreFuture};
pub use upload::{StoredUpload, UploadError, UploadReceiver, sanitize_filename};
