//! # Notification Variant
//!
//! Posts a JSON acknowledgement to an external HTTP endpoint at the points
//! a message is created, signed and committed. Failures are reported to the
//! hook dispatcher, which logs and counts them; the exchange is unaffected.

mod acknowledger;
mod hooks;

pub use acknowledger::MessageAcknowledger;
pub use hooks::NotificationHooks;

use serde::{Deserialize, Serialize};
use shared_types::MessageRecord;
use std::time::Duration;
use uuid::Uuid;

/// Acknowledgement endpoints.
#[derive(Clone, Debug)]
pub struct AcknowledgerConfig {
    /// Base URL, e.g. `http://localhost:8080/messages`
    pub base_url: String,
    pub new_path: String,
    pub signed_path: String,
    pub committed_path: String,
    pub request_timeout: Duration,
}

impl AcknowledgerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            new_path: "new".to_string(),
            signed_path: "signed".to_string(),
            committed_path: "committed".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Body of every acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub party: String,
    pub id: Uuid,
    pub content: String,
    pub committed: bool,
}

impl MessageDto {
    pub fn from_record(record: &MessageRecord, as_sender: bool, committed: bool) -> Self {
        let party = if as_sender {
            record.sender()
        } else {
            record.recipient()
        };
        Self {
            party: party.name.clone(),
            id: *record.id().as_uuid(),
            content: record.contents().to_string(),
            committed,
        }
    }
}
