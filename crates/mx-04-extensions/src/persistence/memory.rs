use super::{MessageEntity, MessageRepository};
use crate::error::ExtensionResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-memory message store, partitioned by party.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    rows: RwLock<BTreeMap<(String, Uuid), MessageEntity>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save(&self, entity: MessageEntity) -> ExtensionResult<MessageEntity> {
        self.rows
            .write()
            .insert((entity.party.clone(), entity.id), entity.clone());
        Ok(entity)
    }

    async fn find_all_by_party(&self, party: &str) -> ExtensionResult<Vec<MessageEntity>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|((owner, _), _)| owner == party)
            .map(|(_, entity)| entity.clone())
            .collect())
    }
}
