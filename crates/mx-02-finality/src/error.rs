//! Error types for the Finality subsystem

use shared_bus::SessionError;
use shared_crypto::CryptoError;
use shared_types::{RecordId, TransactionId};
use thiserror::Error;

/// Finality subsystem errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalityError {
    /// Required signers have not signed
    #[error("Missing signatures from: {}", missing.join(", "))]
    MissingSignatures { missing: Vec<String> },

    /// A signature or signer failed verification
    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// The transaction id does not match what was expected
    #[error("Transaction id mismatch: expected {expected}, got {actual}")]
    TransactionIdMismatch {
        expected: TransactionId,
        actual: TransactionId,
    },

    /// A consumed record was already consumed by an earlier transaction
    #[error("Record {record_id} already consumed by transaction {consumed_by}")]
    ConflictingConsumption {
        record_id: RecordId,
        consumed_by: TransactionId,
    },

    /// A consumed record is not an output of any certified transaction
    #[error("Record {record_id} was not produced by any certified transaction")]
    UnrecognisedInput { record_id: RecordId },

    /// The transaction names a different authority
    #[error("Wrong finality authority: expected {expected}, got {actual}")]
    WrongAuthority { expected: String, actual: String },

    /// A certificate failed verification
    #[error("Invalid finality certificate: {reason}")]
    InvalidCertificate { reason: String },

    /// Something other than a finalized record arrived
    #[error("Unexpected {kind} message while awaiting finality")]
    UnexpectedMessage { kind: &'static str },

    /// Session failure while delivering or awaiting finality
    #[error("Session error: {0}")]
    Channel(SessionError),

    /// No finalized record arrived in time
    #[error("No finality observed within {millis} ms")]
    Timeout { millis: u64 },

    /// The authority could not be reached
    #[error("Finality authority unavailable: {reason}")]
    Unavailable { reason: String },
}

impl From<SessionError> for FinalityError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Timeout { millis } => FinalityError::Timeout { millis },
            other => FinalityError::Channel(other),
        }
    }
}

impl From<CryptoError> for FinalityError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::MissingSignatures { missing } => {
                FinalityError::MissingSignatures { missing }
            }
            CryptoError::WrongAuthority { expected, actual } => {
                FinalityError::WrongAuthority { expected, actual }
            }
            other => FinalityError::InvalidSignature {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for finality operations
pub type FinalityResult<T> = Result<T, FinalityError>;
