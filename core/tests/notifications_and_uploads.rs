//! Notification Dispatcher and Upload Receiver.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code uses unwrap for clear failure messages

use pharmadesk_core::{EmailMessage, NotificationDispatcher, NotifyError, RequestStatus, UploadReceiver};
use pharmadesk_testing::{RecordingEmailProvider, fixtures, test_clock};
use std::sync::Arc;

fn dispatcher(provider: &RecordingEmailProvider, admin: Option<&str>) -> NotificationDispatcher {
    NotificationDispatcher::new(Some(Arc::new(provider.clone())), admin.map(str::to_string))
}

#[tokio::test]
async fn test_test_email_falls_back_to_admin() {
    let provider = RecordingEmailProvider::new();

    let to = dispatcher(&provider, Some("admin@pharmacy.test"))
        .send_test(None)
        .await
        .unwrap();

    assert_eq!(to, "admin@pharmacy.test");
    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@pharmacy.test");
    assert!(sent[0].html.contains("Email delivery is working"));
}

#[tokio::test]
async fn test_explicit_recipient_wins() {
    let provider = RecordingEmailProvider::new();

    dispatcher(&provider, Some("admin@pharmacy.test"))
        .send_test(Some("ops@pharmacy.test"))
        .await
        .unwrap();

    assert_eq!(provider.sent()[0].to, "ops@pharmacy.test");
}

#[tokio::test]
async fn test_provider_failure_propagates() {
    let provider = RecordingEmailProvider::failing(NotifyError::Delivery("503 from provider".into()));

    let result = dispatcher(&provider, None)
        .send(&EmailMessage::new("a@b.test", "Hi", "<p>Hi</p>"))
        .await;

    assert_eq!(result, Err(NotifyError::Delivery("503 from provider".into())));
    assert_eq!(provider.sent().len(), 1);
}

#[tokio::test]
async fn test_status_notification_requires_opt_in_and_email() {
    let provider = RecordingEmailProvider::new();
    let record = fixtures::record("req-7", RequestStatus::Completed).with_field("email", "ada@example.com");

    let off = dispatcher(&provider, None);
    assert_eq!(off.status_changed(&record).await, Ok(false));

    let on = dispatcher(&provider, None).with_status_notifications(true);
    assert_eq!(on.status_changed(&fixtures::pending("req-8")).await, Ok(false));
    assert_eq!(on.status_changed(&record).await, Ok(true));

    let sent = provider.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].html.contains("<strong>completed</strong>"));
}

#[tokio::test]
async fn test_upload_is_written_under_timestamped_name() {
    let dir = tempfile::tempdir().unwrap();
    let uploads_dir = dir.path().join("public").join("uploads");
    let receiver = UploadReceiver::new(&uploads_dir, "/uploads/", Arc::new(test_clock()));

    let stored = receiver.receive("my file@2024!.pdf", b"%PDF-1.7").await.unwrap();

    assert_eq!(stored.filename, "my file@2024!.pdf");
    assert_eq!(stored.file_path, "/uploads/1735689600000_my_file_2024_.pdf");
    let on_disk = std::fs::read(uploads_dir.join("1735689600000_my_file_2024_.pdf")).unwrap();
    assert_eq!(on_disk, b"%PDF-1.7");
}
