//! Application state shared across handlers.

use crate::config::Config;
use pharmadesk_auth::{AdminAuthenticator, AdminCredentials, SessionConfig};
use pharmadesk_core::{
    BackupOrchestrator, BackupSink, Clock, EmailProvider, NotificationDispatcher, RecordStore,
    StatusTransitionHandler, UploadReceiver,
};
use std::sync::Arc;

/// External collaborators the workflows run against.
///
/// Production wiring comes from [`crate::bootstrap::collaborators`]; tests pass
/// in-memory doubles.
#[derive(Clone)]
pub struct Collaborators {
    /// Request records
    pub store: Arc<dyn RecordStore>,
    /// Backup destination
    pub sink: Arc<dyn BackupSink>,
    /// Email provider, if one is configured
    pub email: Option<Arc<dyn EmailProvider>>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

/// Application state shared across all handlers.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Read access for listing endpoints
    pub store: Arc<dyn RecordStore>,
    /// Status Transition Handler
    pub transitions: Arc<StatusTransitionHandler>,
    /// Backup Orchestrator
    pub backups: Arc<BackupOrchestrator>,
    /// Notification Dispatcher
    pub notifications: NotificationDispatcher,
    /// Upload Receiver
    pub uploads: Arc<UploadReceiver>,
    /// Admin login
    pub auth: Arc<AdminAuthenticator>,
}

impl AppState {
    /// Assemble the workflows from collaborators and configuration.
    #[must_use]
    pub fn new(collaborators: Collaborators, config: &Config) -> Self {
        let Collaborators {
            store,
            sink,
            email,
            clock,
        } = collaborators;

        let credentials = AdminCredentials::from_parts(
            config.auth.admin_username.clone(),
            config.auth.admin_password.clone(),
        );
        let session = SessionConfig::default().with_secure(config.auth.cookie_secure);

        Self {
            transitions: Arc::new(StatusTransitionHandler::new(store.clone(), clock.clone())),
            backups: Arc::new(BackupOrchestrator::new(
                store.clone(),
                sink,
                clock.clone(),
                config.backup.api_key.clone(),
            )),
            notifications: NotificationDispatcher::new(email, config.email.admin_email.clone())
                .with_status_notifications(config.email.notify_on_status_change),
            uploads: Arc::new(UploadReceiver::new(
                config.uploads.dir.clone(),
                config.uploads.public_prefix.clone(),
                clock,
            )),
            auth: Arc::new(AdminAuthenticator::new(credentials, session)),
            store,
        }
    }
}
