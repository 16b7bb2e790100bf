//! Backup Orchestrator against recording doubles.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code uses unwrap for clear failure messages

use pharmadesk_core::{BackupError, BackupOrchestrator, RequestStatus, SinkError};
use pharmadesk_testing::{InMemoryRecordStore, RecordingBackupSink, fixtures, test_clock};
use std::sync::Arc;

fn orchestrator(
    store: &InMemoryRecordStore,
    sink: &RecordingBackupSink,
    api_key: Option<&str>,
) -> BackupOrchestrator {
    BackupOrchestrator::new(
        Arc::new(store.clone()),
        Arc::new(sink.clone()),
        Arc::new(test_clock()),
        api_key.map(str::to_string),
    )
}

fn seeded_store() -> InMemoryRecordStore {
    InMemoryRecordStore::with_records([
        fixtures::pending("req-1"),
        fixtures::record("req-2", RequestStatus::Completed),
    ])
}

#[tokio::test]
async fn test_exports_every_record_once() {
    let store = seeded_store();
    let sink = RecordingBackupSink::new();

    let report = orchestrator(&store, &sink, None).run(None).await.unwrap();

    assert_eq!(report.spreadsheet_id, "sheet-1");
    assert_eq!(report.record_count, 2);
    let exports = sink.exports();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].rows.len(), 2);
    assert_eq!(exports[0].header, ["id", "status", "updatedAt", "customer", "items"]);
}

#[tokio::test]
async fn test_wrong_or_missing_key_never_reaches_sink() {
    let store = seeded_store();
    let sink = RecordingBackupSink::new();
    let backup = orchestrator(&store, &sink, Some("s3cret"));

    assert!(backup.requires_api_key());
    assert_eq!(backup.run(None).await, Err(BackupError::Unauthorized));
    assert_eq!(backup.run(Some("S3CRET")).await, Err(BackupError::Unauthorized));
    assert_eq!(backup.run(Some("")).await, Err(BackupError::Unauthorized));
    assert_eq!(sink.export_count(), 0);
}

#[tokio::test]
async fn test_matching_key_runs_backup() {
    let store = seeded_store();
    let sink = RecordingBackupSink::new();

    let report = orchestrator(&store, &sink, Some("s3cret"))
        .run(Some("s3cret"))
        .await
        .unwrap();

    assert_eq!(report.record_count, 2);
    assert_eq!(sink.export_count(), 1);
}

#[tokio::test]
async fn test_empty_key_disables_check() {
    let store = seeded_store();
    let sink = RecordingBackupSink::new();
    let backup = orchestrator(&store, &sink, Some(""));

    assert!(!backup.requires_api_key());
    assert!(backup.run(Some("anything")).await.is_ok());
}

#[tokio::test]
async fn test_sink_failure_is_single_attempt_with_reason() {
    let store = seeded_store();
    let sink = RecordingBackupSink::failing(SinkError::Rejected {
        status: 403,
        message: "quota exceeded".into(),
    });

    let result = orchestrator(&store, &sink, None).run(None).await;

    assert_eq!(
        result,
        Err(BackupError::Export {
            reason: "Sink error (status 403): quota exceeded".into()
        })
    );
    assert_eq!(sink.export_count(), 1);
}

#[tokio::test]
async fn test_store_failure_skips_export() {
    let store = seeded_store();
    store.fail_with("timeout");
    let sink = RecordingBackupSink::new();

    let result = orchestrator(&store, &sink, None).run(None).await;

    assert!(matches!(result, Err(BackupError::Store(_))));
    assert_eq!(sink.export_count(), 0);
}
