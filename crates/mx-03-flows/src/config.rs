//! Session configuration

use std::time::Duration;

/// Per-node session settings
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Upper bound on any single wait for the counterparty.
    pub counter_signature_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            counter_signature_timeout: Duration::from_secs(60),
        }
    }
}
