//! # Session Channel
//!
//! One end of an ordered point-to-point session.

use crate::events::SessionMessage;
use shared_types::{EnvelopeError, Party, SessionEnvelope};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

type Envelope = SessionEnvelope<SessionMessage>;

/// Errors from session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The other end of the session went away.
    #[error("Session channel closed")]
    ChannelClosed,

    /// No inbox is registered for the requested party.
    #[error("Unknown party: {name}")]
    UnknownParty { name: String },

    /// Nothing arrived within the allowed time.
    #[error("Timed out after {millis} ms waiting for counterparty")]
    Timeout { millis: u64 },

    /// An envelope failed verification.
    #[error("Envelope rejected: {0}")]
    Envelope(#[from] EnvelopeError),
}

/// One end of a session.
///
/// Outbound envelopes are numbered from zero; inbound envelopes must arrive
/// from the counterparty with consecutive numbers.
#[derive(Debug)]
pub struct SessionChannel {
    session_id: Uuid,
    local: Party,
    counterparty: Party,
    outbound: mpsc::Sender<Envelope>,
    inbound: mpsc::Receiver<Envelope>,
    next_outbound: u64,
    next_inbound: u64,
}

impl SessionChannel {
    /// Create both ends of a new session between `initiator` and `responder`.
    pub(crate) fn pair(
        initiator: Party,
        responder: Party,
        capacity: usize,
    ) -> (SessionChannel, SessionChannel) {
        let session_id = Uuid::new_v4();
        let (to_responder, from_initiator) = mpsc::channel(capacity);
        let (to_initiator, from_responder) = mpsc::channel(capacity);

        let initiator_end = SessionChannel {
            session_id,
            local: initiator.clone(),
            counterparty: responder.clone(),
            outbound: to_responder,
            inbound: from_responder,
            next_outbound: 0,
            next_inbound: 0,
        };
        let responder_end = SessionChannel {
            session_id,
            local: responder,
            counterparty: initiator,
            outbound: to_initiator,
            inbound: from_initiator,
            next_outbound: 0,
            next_inbound: 0,
        };
        (initiator_end, responder_end)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn local(&self) -> &Party {
        &self.local
    }

    pub fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    /// Send a message to the counterparty.
    pub async fn send(&mut self, message: SessionMessage) -> Result<(), SessionError> {
        let kind = message.kind();
        let envelope =
            SessionEnvelope::new(self.session_id, self.local.clone(), self.next_outbound, message);
        self.outbound
            .send(envelope)
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        debug!(
            session_id = %self.session_id,
            to = %self.counterparty,
            sequence = self.next_outbound,
            kind,
            "Session message sent"
        );
        self.next_outbound += 1;
        Ok(())
    }

    /// Receive the next message from the counterparty.
    pub async fn receive(&mut self) -> Result<SessionMessage, SessionError> {
        let envelope = self
            .inbound
            .recv()
            .await
            .ok_or(SessionError::ChannelClosed)?;

        if let Err(e) = envelope.verify(&self.counterparty, self.next_inbound) {
            warn!(session_id = %self.session_id, error = %e, "Rejecting session envelope");
            return Err(e.into());
        }
        self.next_inbound += 1;

        let message = envelope.into_payload();
        debug!(
            session_id = %self.session_id,
            from = %self.counterparty,
            kind = message.kind(),
            "Session message received"
        );
        Ok(message)
    }

    /// Receive with an upper bound on the wait.
    pub async fn receive_within(&mut self, limit: Duration) -> Result<SessionMessage, SessionError> {
        match tokio::time::timeout(limit, self.receive()).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                millis: limit.as_millis() as u64,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn raw_outbound(&self) -> mpsc::Sender<Envelope> {
        self.outbound.clone()
    }
}
