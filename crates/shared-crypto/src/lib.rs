//! # Shared Crypto - Party Signatures
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Party key pairs, transaction and certificate signatures |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Content binding**: a transaction signature is only checked after the
//!   transaction id is recomputed from its content

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use signatures::{
    verify_certificate, verify_signature, verify_signed_transaction, PartyKeyPair,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
