//! # Shared Bus - Counterparty Session Channels
//!
//! Carries the messages of one exchange between its initiator and responder.
//!
//! ## Rules
//!
//! - Every protocol run gets its own session: one ordered, reliable,
//!   point-to-point channel in each direction
//! - All messages are wrapped in a `SessionEnvelope<T>` that is checked for
//!   version, sender and sequence on receipt
//! - Sessions share no state with each other
//!
//! ## Session Opening
//!
//! ```text
//! ┌──────────────┐  open_session()   ┌──────────────┐   InboundSession   ┌──────────────┐
//! │  Initiator   │ ────────────────→ │    Router    │ ─────────────────→ │ Responder    │
//! │              │                   └──────────────┘                    │  inbox       │
//! │              │ ←──────────── SessionChannel pair ──────────────────→ │              │
//! └──────────────┘                                                       └──────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod router;
pub mod session;

// Re-export main types
pub use events::{InboundSession, SessionMessage};
pub use router::{InMemorySessionRouter, SessionInbox, SessionRouter};
pub use session::{SessionChannel, SessionError};

/// Maximum messages buffered per session direction before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Maximum unaccepted inbound sessions queued per party.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;
