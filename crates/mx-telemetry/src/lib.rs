//! # Message-Exchange Telemetry
//!
//! Logging initialisation and Prometheus collectors shared by every crate in
//! the workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mx_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MX_LOG_LEVEL` | `info` | Log filter, used when `RUST_LOG` is unset |
//! | `MX_JSON_LOGS` | `false` | Emit JSON lines instead of plain text |
//! | `MX_SERVICE_NAME` | `message-exchange` | Service name attached to startup logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, FINALITY_CERTIFICATES, HOOK_FAILURES, SESSIONS_FINISHED, SESSIONS_STARTED,
};

use thiserror::Error;

/// Telemetry initialisation errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),
}

/// Open a span for one protocol session.
///
/// ```rust,ignore
/// let span = session_span!("initiator", session_id = %id);
/// ```
#[macro_export]
macro_rules! session_span {
    ($role:expr, $($field:tt)*) => {
        tracing::info_span!("session", role = $role, $($field)*)
    };
}
