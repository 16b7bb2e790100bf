//! Pharmadesk HTTP server.
//!
//! Admin API for a pharmacy's request workflow: login, request status
//! updates, spreadsheet backups, test email and file uploads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::{AppState, Collaborators};
