//! Error types for the Contract Verifier

use thiserror::Error;

/// Reasons a transition is refused before signing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Structural contract breach
    #[error("Invalid transition: {reason}")]
    InvalidTransition { reason: String },

    /// Business rule breach from a registered predicate
    #[error("Extra validation rejected: {reason}")]
    ExtraValidationRejected { reason: String },
}

impl ContractError {
    /// The bare reason, without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            ContractError::InvalidTransition { reason }
            | ContractError::ExtraValidationRejected { reason } => reason,
        }
    }
}

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;
