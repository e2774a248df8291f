//! Error types for protocol sessions

use crate::domain::{Role, TerminalState};
use mx_01_contract::ContractError;
use mx_02_finality::FinalityError;
use shared_types::TransactionId;
use thiserror::Error;

/// Why a session did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Structural contract breach
    #[error("Invalid transition: {reason}")]
    InvalidTransition { reason: String },

    /// A registered predicate refused the transition
    #[error("Extra validation rejected: {reason}")]
    ExtraValidationRejected { reason: String },

    /// The responder declined; `reason` is exactly what it sent
    #[error("Counterparty rejected: {reason}")]
    CounterpartyRejected { reason: String },

    /// The session failed before completion
    #[error("Session channel closed: {detail}")]
    ChannelClosed { detail: String },

    /// The authority could not certify, or its result did not verify
    #[error("Finality failed: {reason}")]
    FinalityFailed { reason: String },

    /// No finalized result within the deadline
    #[error("No finality observed within {millis} ms")]
    FinalityTimeout { millis: u64 },

    /// A party signature did not verify
    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// The counterparty did not answer within the deadline
    #[error("No counterparty response within {millis} ms")]
    CounterSignatureTimeout { millis: u64 },

    /// A message arrived that the current phase does not accept
    #[error("Protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    /// The finalized transaction is not the one that was signed
    #[error("Finalized transaction {actual} does not match signed transaction {expected}")]
    FinalizedTransactionMismatch {
        expected: TransactionId,
        actual: TransactionId,
    },
}

impl FlowError {
    /// Terminal state this failure ends a session in, for the given side.
    ///
    /// A responder never collects signatures: anything that stops it before
    /// counter-signing is a failed validation, and anything after that is a
    /// failed finality.
    pub fn terminal_state(&self, role: Role) -> TerminalState {
        match role {
            Role::Initiator => self.initiator_state(),
            Role::Responder => self.responder_state(),
        }
    }

    fn initiator_state(&self) -> TerminalState {
        match self {
            FlowError::InvalidTransition { .. } | FlowError::ExtraValidationRejected { .. } => {
                TerminalState::ValidationFailed
            }
            FlowError::CounterpartyRejected { .. }
            | FlowError::ChannelClosed { .. }
            | FlowError::InvalidSignature { .. }
            | FlowError::CounterSignatureTimeout { .. }
            | FlowError::ProtocolViolation { .. } => TerminalState::SignatureCollectionFailed,
            FlowError::FinalityFailed { .. } | FlowError::FinalizedTransactionMismatch { .. } => {
                TerminalState::FinalityFailed
            }
            FlowError::FinalityTimeout { .. } => TerminalState::FinalityTimeout,
        }
    }

    fn responder_state(&self) -> TerminalState {
        match self {
            FlowError::InvalidTransition { .. }
            | FlowError::ExtraValidationRejected { .. }
            | FlowError::InvalidSignature { .. }
            | FlowError::ProtocolViolation { .. } => TerminalState::ValidationFailed,
            FlowError::FinalityTimeout { .. } => TerminalState::FinalityTimeout,
            FlowError::CounterpartyRejected { .. }
            | FlowError::ChannelClosed { .. }
            | FlowError::CounterSignatureTimeout { .. }
            | FlowError::FinalityFailed { .. }
            | FlowError::FinalizedTransactionMismatch { .. } => TerminalState::FinalityFailed,
        }
    }

    /// Reason text sent to the counterparty when this failure is a rejection.
    pub fn rejection_reason(&self) -> String {
        match self {
            FlowError::InvalidTransition { reason }
            | FlowError::ExtraValidationRejected { reason }
            | FlowError::InvalidSignature { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ContractError> for FlowError {
    fn from(e: ContractError) -> Self {
        match e {
            ContractError::InvalidTransition { reason } => FlowError::InvalidTransition { reason },
            ContractError::ExtraValidationRejected { reason } => {
                FlowError::ExtraValidationRejected { reason }
            }
        }
    }
}

impl From<FinalityError> for FlowError {
    fn from(e: FinalityError) -> Self {
        match e {
            FinalityError::Timeout { millis } => FlowError::FinalityTimeout { millis },
            FinalityError::TransactionIdMismatch { expected, actual } => {
                FlowError::FinalizedTransactionMismatch { expected, actual }
            }
            other => FlowError::FinalityFailed {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for sessions
pub type FlowResult<T> = Result<T, FlowError>;

/// Failure inside a hook. Never propagated past the hook dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("Store error: {reason}")]
    Store { reason: String },

    #[error("Notification error: {reason}")]
    Notification { reason: String },

    #[error("Hook error: {reason}")]
    Other { reason: String },
}

/// Result type for hooks
pub type HookResult = Result<(), HookError>;
