//! # Persistence Variant
//!
//! Keeps a per-party view of exchanged messages, keyed by (party, record id)
//! and tracking whether the message is committed.

mod hooks;
mod memory;

pub use hooks::PersistenceHooks;
pub use memory::InMemoryMessageRepository;

use crate::error::ExtensionResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::MessageRecord;
use uuid::Uuid;

/// A stored message as seen by one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Name of the party this row belongs to
    pub party: String,
    pub id: Uuid,
    pub content: String,
    pub committed: bool,
}

impl MessageEntity {
    /// Row for the sender's (`as_sender`) or the recipient's view of `record`.
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

/// Message store port.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert or replace the row for `(entity.party, entity.id)`.
    async fn save(&self, entity: MessageEntity) -> ExtensionResult<MessageEntity>;

    /// All rows belonging to `party`.
    async fn find_all_by_party(&self, party: &str) -> ExtensionResult<Vec<MessageEntity>>;
}
