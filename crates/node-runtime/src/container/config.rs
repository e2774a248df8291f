//! # Node Configuration
//!
//! Identity, session timing and extension switches for one node.
//!
//! ## Environment Overrides
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `MX_NODE_NAME` | `identity.name` | `PartyA` |
//! | `MX_NODE_SEED` | `identity.seed` (64 hex chars) | random key |
//! | `MX_FINALITY_TIMEOUT_MS` | `session.finality_timeout` | 30 000 |
//! | `MX_COUNTER_SIGNATURE_TIMEOUT_MS` | `session.counter_signature_timeout` | 60 000 |
//! | `MX_CHANNEL_CAPACITY` | `session.channel_capacity` | 64 |
//! | `MX_REQUIRED_PHRASE` | `extensions.required_phrase` | off |
//! | `MX_PERSISTENCE` | `extensions.persistence` | `false` |
//! | `MX_ACK_BASE_URL` | `extensions.acknowledgements` | off |
//! | `MX_ACK_PATH_NEW` / `_SIGNED` / `_COMMITTED` | acknowledgement paths | `new` / `signed` / `committed` |

use mx_03_flows::SessionConfig;
use mx_04_extensions::AcknowledgerConfig;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Who this node signs as.
    pub identity: IdentityConfig,
    /// Session timing and buffering.
    pub session: SessionSettings,
    /// Optional hook variants.
    pub extensions: ExtensionsConfig,
}

impl NodeConfig {
    /// Configuration for a node called `name`, everything else default.
    pub fn named(name: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.identity.name = name.into();
        config
    }

    /// Check the configuration is usable.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - The node name is empty
    /// - Either timeout is zero
    /// - The channel capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.name.trim().is_empty() {
            return Err(ConfigError::EmptyNodeName);
        }
        if self.session.finality_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                name: "finality_timeout",
            });
        }
        if self.session.counter_signature_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                name: "counter_signature_timeout",
            });
        }
        if self.session.channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(())
    }

    /// Session settings in the shape the flows expect.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            counter_signature_timeout: self.session.counter_signature_timeout,
        }
    }

    /// Build a configuration from defaults plus whatever `lookup` returns.
    ///
    /// Malformed numeric values are ignored with a warning. A malformed seed
    /// is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("MX_NODE_NAME") {
            config.identity.name = name;
        }
        if let Some(seed_hex) = lookup("MX_NODE_SEED") {
            config.identity.seed = Some(parse_seed(&seed_hex)?);
            info!("Loaded node seed from environment");
        }

        if let Some(ms) = parse_number::<u64>(&lookup, "MX_FINALITY_TIMEOUT_MS") {
            config.session.finality_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_number::<u64>(&lookup, "MX_COUNTER_SIGNATURE_TIMEOUT_MS") {
            config.session.counter_signature_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = parse_number::<usize>(&lookup, "MX_CHANNEL_CAPACITY") {
            config.session.channel_capacity = capacity;
        }

        config.extensions.required_phrase = lookup("MX_REQUIRED_PHRASE");
        if let Some(flag) = lookup("MX_PERSISTENCE") {
            config.extensions.persistence = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(base_url) = lookup("MX_ACK_BASE_URL") {
            let mut ack = AcknowledgerConfig::new(base_url);
            if let Some(path) = lookup("MX_ACK_PATH_NEW") {
                ack.new_path = path;
            }
            if let Some(path) = lookup("MX_ACK_PATH_SIGNED") {
                ack.signed_path = path;
            }
            if let Some(path) = lookup("MX_ACK_PATH_COMMITTED") {
                ack.committed_path = path;
            }
            config.extensions.acknowledgements = Some(ack);
        }

        Ok(config)
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    NodeConfig::from_lookup(|key| std::env::var(key).ok())
}

fn parse_seed(seed_hex: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(seed_hex.trim()).map_err(|_| ConfigError::InvalidSeed)?;
    bytes.try_into().map_err(|_| ConfigError::InvalidSeed)
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring malformed numeric setting");
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Node name must not be empty. Set MX_NODE_NAME.")]
    EmptyNodeName,

    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },

    #[error("Session channel capacity must be greater than zero")]
    ZeroChannelCapacity,

    #[error("MX_NODE_SEED must be 32 bytes (64 hex chars)")]
    InvalidSeed,
}

/// Identity configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Party name other nodes address this node by.
    pub name: String,
    /// Ed25519 secret seed. A random key is generated when absent.
    pub seed: Option<[u8; 32]>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "PartyA".to_string(),
            seed: None,
        }
    }
}

/// Session timing and buffering.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upper bound on waiting for a finalized transaction.
    pub finality_timeout: Duration,
    /// Upper bound on every wait for the counterparty.
    pub counter_signature_timeout: Duration,
    /// Per-direction session buffer.
    pub channel_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            finality_timeout: Duration::from_secs(30),
            counter_signature_timeout: Duration::from_secs(60),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Hook variants switched on for this node.
#[derive(Debug, Clone, Default)]
pub struct ExtensionsConfig {
    /// Phrase every message must contain, checked on both sides.
    pub required_phrase: Option<String>,
    /// Record messages in the in-memory repository.
    pub persistence: bool,
    /// Post acknowledgements to an HTTP endpoint.
    pub acknowledgements: Option<AcknowledgerConfig>,
}
