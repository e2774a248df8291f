//! # mx-01-contract
//!
//! Contract Verifier for message transitions.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Structural rules**: `Send` consumes nothing, `Reply` consumes exactly
//!   one record, and both produce exactly one record
//! - **Reply chaining**: a reply answers the record it consumes, with sender
//!   and recipient reversed
//! - **Extra predicates**: deployment-specific business rules run after the
//!   structural check, first failure wins
//!
//! Verification is pure and deterministic. Both sides of an exchange run the
//! same rules before they sign, so no party signs something its own rules
//! would reject.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mx_01_contract::{ContractRules, require};
//!
//! let rules = ContractRules::new().with_check("no-shouting", |tx| {
//!     let record = tx.single_output().ok_or("There must be only one output message")?;
//!     require(record.contents() != record.contents().to_uppercase(), "Stop shouting")
//! });
//! rules.verify(&transition)?;
//! ```

pub mod error;
pub mod predicate;
pub mod rules;
pub mod verifier;

pub use error::{ContractError, ContractResult};
pub use predicate::{require, PredicateFn, TransitionPredicate};
pub use rules::ContractRules;
pub use verifier::{ContractVerifier, REPLY_PARTIES_SWAPPED, REPLY_UNCHAINED};
