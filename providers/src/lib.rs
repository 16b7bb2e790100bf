//! # Pharmadesk Providers
//!
//! Concrete implementations of the outbound seams defined in `pharmadesk-core`:
//!
//! - [`ResendEmailProvider`]: HTTP transactional-email API (Resend-compatible)
//! - [`SmtpEmailProvider`]: SMTP relay via `lettre`
//! - [`ConsoleEmailProvider`]: logs messages instead of sending them
//! - [`GoogleSheetsSink`]: backup sink writing to a Google Sheets-compatible API
//!
//! Every provider makes exactly one attempt per call. Failures map onto
//! [`pharmadesk_core::NotifyError`] or [`pharmadesk_core::SinkError`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod console;
mod resend;
mod sheets;
mod smtp;

pub use console::ConsoleEmailProvider;
pub use resend::ResendEmailProvider;
pub use sheets::GoogleSheetsSink;
pub use smtp::SmtpEmailProvider;
