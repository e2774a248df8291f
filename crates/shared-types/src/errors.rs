//! # Error Types
//!
//! Defines error types raised by the shared entities.

use thiserror::Error;

/// Errors raised while assembling entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// The same key tried to sign a transaction twice.
    #[error("Duplicate signature from key {signer}")]
    DuplicateSignature { signer: String },
}

/// Errors related to session envelope verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Envelope version not supported.
    #[error("Unsupported version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u16, supported: u16 },

    /// Envelope did not come from the expected counterparty.
    #[error("Sender mismatch: expected {expected}, got {actual}")]
    SenderMismatch { expected: String, actual: String },

    /// Envelope arrived out of sequence.
    #[error("Out of order: expected sequence {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },
}
