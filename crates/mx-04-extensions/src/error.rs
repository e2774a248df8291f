//! Error types for hook variants

use mx_03_flows::HookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Repository failure
    #[error("Store error: {0}")]
    Store(String),

    /// Acknowledgement request could not be sent or was refused
    #[error("Acknowledgement to {url} failed: {reason}")]
    Acknowledgement { url: String, reason: String },

    /// Client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<ExtensionError> for HookError {
    fn from(e: ExtensionError) -> Self {
        match e {
            ExtensionError::Store(reason) => HookError::Store { reason },
            other => HookError::Notification {
                reason: other.to_string(),
            },
        }
    }
}

pub type ExtensionResult<T> = Result<T, ExtensionError>;
