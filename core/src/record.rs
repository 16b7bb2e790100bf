//! Request/order record model.
//!
//! A record is a document with three managed fields (`id`, `status`,
//! `updatedAt`) and any number of opaque business fields (customer, items,
//! prescription notes...) that every workflow passes through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Processing status of a request.
///
/// The three values form an unordered set: any status may be replaced by any
/// other, including itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    /// Received, not yet picked up.
    Pending,
    /// Being prepared by the pharmacy.
    InProgress,
    /// Ready or delivered.
    Completed,
}

impl RequestStatus {
    /// Every recognised status, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside `pending | in-progress | completed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status '{0}': expected one of pending, in-progress, completed")]
pub struct InvalidStatus(pub String);

impl FromStr for RequestStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// A single order/request document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Record identifier.
    pub id: RequestId,

    /// Current status.
    pub status: RequestStatus,

    /// Time of the last status mutation.
    pub updated_at: DateTime<Utc>,

    /// Business fields, opaque to the workflows.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RequestRecord {
    /// Create a record with no business fields.
    #[must_use]
    pub fn new(id: impl Into<String>, status: RequestStatus, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(id),
            status,
            updated_at,
            fields: Map::new(),
        }
    }

    /// Attach a business field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The customer's email address, if the record carries one.
    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.fields
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!("pending".parse::<RequestStatus>(), Ok(RequestStatus::Pending));
        assert_eq!("in-progress".parse::<RequestStatus>(), Ok(RequestStatus::InProgress));
        assert_eq!("completed".parse::<RequestStatus>(), Ok(RequestStatus::Completed));
        assert_eq!(RequestStatus::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_status_parsing_is_exact() {
        for raw in ["", "Pending", " pending", "in_progress", "In-Progress", "done"] {
            assert_eq!(
                raw.parse::<RequestStatus>(),
                Err(InvalidStatus(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_record_json_shape() {
        let at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = RequestRecord::new("req-1", RequestStatus::InProgress, at)
            .with_field("customer", "Ada")
            .with_field("items", json!(["amoxicillin"]));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "req-1");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["updatedAt"], "2025-01-01T00:00:00Z");
        assert_eq!(value["customer"], "Ada");

        let back: RequestRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_contact_email() {
        let at = Utc::now();
        let record = RequestRecord::new("r", RequestStatus::Pending, at);
        assert_eq!(record.contact_email(), None);

        let record = record.with_field("email", "ada@example.com");
        assert_eq!(record.contact_email(), Some("ada@example.com"));

        let blank = RequestRecord::new("r", RequestStatus::Pending, at).with_field("email", "  ");
        assert_eq!(blank.contact_email(), None);
    }

    proptest! {
        #[test]
        fn prop_only_three_statuses_parse(raw in ".*") {
            let parsed = raw.parse::<RequestStatus>();
            let recognised = matches!(raw.as_str(), "pending" | "in-progress" | "completed");
            prop_assert_eq!(parsed.is_ok(), recognised);
        }
    }
}
