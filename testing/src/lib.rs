//! # Pharmadesk Testing
//!
//! Testing utilities for the Pharmadesk backend.
//!
//! Contents:
//! - Deterministic clocks (`FixedClock`, `SteppingClock`)
//! - An in-memory `RecordStore` that counts writes
//! - Recording doubles for the backup sink and email provider
//! - Record fixtures
//!
//! ## Example
//!
//! ```ignore
//! use pharmadesk_testing::{InMemoryRecordStore, test_clock, fixtures};
//!
//! #[tokio::test]
//! async fn test_status_update() {
//!     let store = Arc::new(InMemoryRecordStore::with_records([fixtures::pending("req-1")]));
//!     let handler = StatusTransitionHandler::new(store.clone(), Arc::new(test_clock()));
//!
//!     handler.apply("req-1", Some("completed")).await.unwrap();
//!
//!     assert_eq!(store.write_count(), 1);
//! }
//! ```

mod provider_mocks;
mod store_mocks;

use chrono::{DateTime, Utc};
use pharmadesk_core::environment::Clock;

pub use provider_mocks::{RecordingBackupSink, RecordingEmailProvider};
pub use store_mocks::InMemoryRecordStore;

/// Mock clocks for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Mutex;

    /// Clock frozen at one instant.
    ///
    /// # Example
    ///
    /// ```
    /// use pharmadesk_testing::mocks::FixedClock;
    /// use pharmadesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Freeze at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step after every reading.
    ///
    /// Useful where a test needs successive operations to see strictly
    /// increasing timestamps.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Start at `start`, advancing by `step` per call.
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// The default test instant: 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_instant() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// [`FixedClock`] at [`test_instant`].
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_instant())
    }
}

/// Record fixtures.
pub mod fixtures {
    use super::mocks::test_instant;
    use pharmadesk_core::{RequestRecord, RequestStatus};

    /// A record in `status` with a customer and one item.
    #[must_use]
    pub fn record(id: &str, status: RequestStatus) -> RequestRecord {
        RequestRecord::new(id, status, test_instant())
            .with_field("customer", "Ada Lovelace")
            .with_field("items", serde_json::json!(["amoxicillin 500mg"]))
    }

    /// A pending record.
    #[must_use]
    pub fn pending(id: &str) -> RequestRecord {
        record(id, RequestStatus::Pending)
    }
}

pub use mocks::{FixedClock, SteppingClock, test_clock};
