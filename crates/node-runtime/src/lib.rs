//! # Node Runtime Library
//!
//! This library exposes the node wiring for the binary and for tests.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `container/` - Configuration and component construction
//! - `node` - Inbound accept loop and the send / reply triggers

#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod error;
pub mod node;

pub use container::{load_config, ConfigError, NodeComponents, NodeConfig};
pub use error::{NodeError, NodeResult};
pub use node::{Node, ResponderOutcome, NOTHING_TO_REPLY_TO};
