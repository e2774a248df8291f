//! # mx-02-finality
//!
//! Finality Authority boundary for message exchanges.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **`FinalityAuthority` port**: certify a fully signed transaction
//! - **`NotaryService`**: in-memory authority enforcing uniqueness of
//!   consumed records and a single total order of certificates
//! - **`FinalityClient`**: submit on the initiator side, await on the
//!   responder side
//!
//! ## Architecture
//!
//! ```text
//! Initiator ──submit(stx, sessions)──→ FinalityClient ──certify──→ FinalityAuthority
//!                                            │
//!                                            └── Finalized ──→ session ──→ Responder
//!                                                                  │
//!                                                   await_finality(expected id)
//! ```
//!
//! ## Zero-Trust
//!
//! Every certificate is re-verified against the authority identity before a
//! finalized record is returned, on both sides.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mx_02_finality::{FinalityClient, NotaryService, FinalityConfig};
//!
//! let notary = Arc::new(NotaryService::new(notary_keys, FinalityConfig::default()));
//! let client = FinalityClient::new(notary, Duration::from_secs(30));
//! let finalized = client.submit(&stx, &mut [session]).await?;
//! ```

pub mod adapters;
pub mod client;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::SystemClock;
pub use client::FinalityClient;
pub use error::{FinalityError, FinalityResult};
pub use ports::inbound::FinalityAuthority;
pub use ports::outbound::TimeSource;
pub use service::{FinalityConfig, NotaryService};
