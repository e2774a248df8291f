//! # Session Messages
//!
//! The payloads carried on a counterparty session.

use crate::session::SessionChannel;
use serde::{Deserialize, Serialize};
use shared_types::{FinalizedRecord, SignedTransaction, TransactionSignature};

/// A message exchanged between initiator and responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMessage {
    /// Initiator → responder: the transition, signed by the initiator.
    Propose(SignedTransaction),
    /// Responder → initiator: the responder's counter-signature.
    CounterSignature(TransactionSignature),
    /// Responder → initiator: the transition was declined.
    Rejection {
        /// Reason, transmitted verbatim.
        reason: String,
    },
    /// Initiator (on behalf of the authority) → responder: the finalized result.
    Finalized(FinalizedRecord),
}

impl SessionMessage {
    /// Short name of the message kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionMessage::Propose(_) => "Propose",
            SessionMessage::CounterSignature(_) => "CounterSignature",
            SessionMessage::Rejection { .. } => "Rejection",
            SessionMessage::Finalized(_) => "Finalized",
        }
    }
}

/// A session opened by a remote initiator, waiting to be handled.
#[derive(Debug)]
pub struct InboundSession {
    /// Protocol name the initiator asked for.
    pub protocol: String,
    /// The responder's end of the session.
    pub channel: SessionChannel,
}
