use super::{MessageEntity, MessageRepository};
use async_trait::async_trait;
use mx_03_flows::{HookError, HookResult, InitiatorHooks, ResponderHooks};
use shared_types::{FinalizedRecord, MessageRecord, SignedTransaction};
use std::sync::Arc;
use tracing::info;

/// Stores each side's view of the message as the exchange progresses.
///
/// The initiator stores its message as pending before building and as
/// committed once final; the responder stores it once committed.
#[derive(Clone)]
pub struct PersistenceHooks {
    repository: Arc<dyn MessageRepository>,
}

impl PersistenceHooks {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    async fn store(&self, record: &MessageRecord, as_sender: bool, committed: bool) -> HookResult {
        self.repository
            .save(MessageEntity::from_record(record, as_sender, committed))
            .await?;
        Ok(())
    }
}

fn produced(transaction: &SignedTransaction) -> Result<&MessageRecord, HookError> {
    transaction
        .transition
        .single_output()
        .ok_or_else(|| HookError::Other {
            reason: "transaction has no single output".to_string(),
        })
}

fn committed(finalized: &FinalizedRecord) -> Result<&MessageRecord, HookError> {
    produced(&finalized.transaction)
}

#[async_trait]
impl InitiatorHooks for PersistenceHooks {
    async fn before_build(&self, record: &MessageRecord) -> HookResult {
        self.store(record, true, false).await?;
        info!(record_id = %record.id(), "Starting transaction for message");
        Ok(())
    }

    async fn before_signature_request(&self, transaction: &SignedTransaction) -> HookResult {
        let pending: Vec<&str> = transaction
            .missing_signers()
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        info!(
            tx_id = %transaction.id.short(),
            signers = ?pending,
            "Collecting signatures for message"
        );
        Ok(())
    }

    async fn after_signature_collected(&self, transaction: &SignedTransaction) -> HookResult {
        info!(tx_id = %transaction.id.short(), "Collected signatures for message");
        Ok(())
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        let record = committed(finalized)?;
        self.store(record, true, true).await?;
        info!(record_id = %record.id(), "Committed transaction for message");
        Ok(())
    }
}

#[async_trait]
impl ResponderHooks for PersistenceHooks {
    async fn after_counter_signed(&self, transaction: &SignedTransaction) -> HookResult {
        let record = produced(transaction)?;
        info!(record_id = %record.id(), "Signed transaction for message");
        Ok(())
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        let record = committed(finalized)?;
        self.store(record, false, true).await?;
        info!(record_id = %record.id(), "Committed transaction for message");
        Ok(())
    }
}
