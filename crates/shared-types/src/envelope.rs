//! # `SessionEnvelope` Wrapper
//!
//! The wrapper for every message carried on a counterparty session.
//!
//! ## Properties
//!
//! - **Versioning**: All envelopes include a `version` field for forward compatibility.
//! - **Correlation**: `session_id` ties every envelope to one protocol run.
//! - **Ordering**: `sequence` starts at zero per direction and increases by one.
//! - **Envelope Authority**: The `sender` is checked against the expected counterparty.

use crate::entities::Party;
use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope around a session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnvelope<T> {
    /// Protocol version for forward compatibility.
    pub version: u16,

    /// The protocol run this envelope belongs to.
    pub session_id: Uuid,

    /// The party that produced this envelope.
    pub sender: Party,

    /// Per-direction sequence number.
    pub sequence: u64,

    /// The actual message payload (generic over message type).
    pub payload: T,
}

impl<T> SessionEnvelope<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    pub fn new(session_id: Uuid, sender: Party, sequence: u64, payload: T) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            session_id,
            sender,
            sequence,
            payload,
        }
    }

    /// Check version, sender and sequence against what the receiver expects.
    pub fn verify(&self, expected_sender: &Party, expected_sequence: u64) -> Result<(), EnvelopeError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(EnvelopeError::UnsupportedVersion {
                received: self.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        if &self.sender != expected_sender {
            return Err(EnvelopeError::SenderMismatch {
                expected: expected_sender.name.clone(),
                actual: self.sender.name.clone(),
            });
        }
        if self.sequence != expected_sequence {
            return Err(EnvelopeError::OutOfOrder {
                expected: expected_sequence,
                actual: self.sequence,
            });
        }
        Ok(())
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}
