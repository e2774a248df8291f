use super::MessageAcknowledger;
use async_trait::async_trait;
use mx_03_flows::{HookError, HookResult, InitiatorHooks, ResponderHooks};
use shared_types::{FinalizedRecord, MessageRecord, SignedTransaction};
use std::sync::Arc;

/// Acknowledges each stage of the exchange over HTTP.
///
/// Initiator: new, signed, committed. Responder: signed, committed.
#[derive(Clone)]
pub struct NotificationHooks {
    acknowledger: Arc<MessageAcknowledger>,
}

impl NotificationHooks {
    pub fn new(acknowledger: Arc<MessageAcknowledger>) -> Self {
        Self { acknowledger }
    }
}

fn output(transaction: &SignedTransaction) -> Result<&MessageRecord, HookError> {
    transaction
        .transition
        .single_output()
        .ok_or_else(|| HookError::Other {
            reason: "transaction has no single output".to_string(),
        })
}

#[async_trait]
impl InitiatorHooks for NotificationHooks {
    async fn before_build(&self, record: &MessageRecord) -> HookResult {
        self.acknowledger
            .new_message_received(record, true)
            .await
            .map_err(HookError::from)
    }

    async fn after_signature_collected(&self, transaction: &SignedTransaction) -> HookResult {
        let record = output(transaction)?;
        self.acknowledger
            .message_transaction_signed(record, true)
            .await
            .map_err(HookError::from)
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        let record = output(&finalized.transaction)?;
        self.acknowledger
            .message_transaction_committed(record, true)
            .await
            .map_err(HookError::from)
    }
}

#[async_trait]
impl ResponderHooks for NotificationHooks {
    async fn after_counter_signed(&self, transaction: &SignedTransaction) -> HookResult {
        let record = output(transaction)?;
        self.acknowledger
            .message_transaction_signed(record, false)
            .await
            .map_err(HookError::from)
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        let record = output(&finalized.transaction)?;
        self.acknowledger
            .message_transaction_committed(record, false)
            .await
            .map_err(HookError::from)
    }
}
