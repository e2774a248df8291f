//! # Node Container
//!
//! Builds the pieces a node is made of from its configuration: the signing
//! identity, the contract rules and the hook chains for both session roles.

pub mod components;
pub mod config;

pub use components::NodeComponents;
pub use config::{load_config, ConfigError, NodeConfig};
