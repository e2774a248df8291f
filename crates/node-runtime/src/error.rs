//! Node-level errors.

use crate::container::ConfigError;
use mx_04_extensions::ExtensionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build extension: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Node {name} is already running")]
    AlreadyStarted { name: String },
}

pub type NodeResult<T> = Result<T, NodeError>;
