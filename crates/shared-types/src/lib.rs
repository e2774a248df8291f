//! # Shared Types Crate
//!
//! This crate contains the domain entities exchanged by the two parties of a
//! message exchange, and the `SessionEnvelope<T>` wrapper used on every
//! counterparty session.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Immutable Records**: A `MessageRecord` is never mutated; replying
//!   produces a new record that consumes the prior one.
//! - **Content-Addressed Transactions**: A `TransactionId` is derived from the
//!   transition it names, so a substituted transition cannot keep the id.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::SessionEnvelope;
pub use errors::*;
