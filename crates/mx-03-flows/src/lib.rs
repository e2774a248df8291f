//! # mx-03-flows
//!
//! The two sides of a message exchange.
//!
//! ## Overview
//!
//! - **Initiator**: builds the transition, validates and signs it, collects
//!   the counterparty's signature and submits the result for finality
//! - **Responder**: validates the proposal, counter-signs it and waits for
//!   the finalized result
//! - **Hooks**: optional observers fired at fixed points of either side
//! - **Registry**: protocol name to responder, resolved when a session is
//!   accepted
//!
//! ## Initiator Phases
//!
//! ```text
//! [Build] → [SelfValidate] → [SelfSign] → [OpenSession] → [CollectCounterSignature]
//!    │            │                                                │
//!  before_build   └─✗→ ValidationFailed (no network)               ├─✗→ SignatureCollectionFailed
//!                                                                  ↓
//!                                 [Complete] ← [SubmitFinality] ───┴─✗→ FinalityFailed
//! ```
//!
//! ## Responder Phases
//!
//! ```text
//! [Receive] → [PreSignValidate] → [CounterSign] → [AwaitFinality] → [Complete]
//!                     │                                 │
//!                     └─✗→ Rejection sent,              └─✗→ FinalityFailed / FinalityTimeout
//!                          ValidationFailed
//! ```
//!
//! Every phase runs at most once per session. Hook failures are logged and
//! counted but never change the outcome; extra validation is expressed as a
//! contract predicate instead, where rejection is a first-class failure.

pub mod config;
pub mod domain;
pub mod error;
pub mod hooks;
pub mod initiator;
pub mod registry;
pub mod responder;

#[cfg(test)]
mod test_utils;

pub use config::SessionConfig;
pub use domain::{InitiatorPhase, ResponderPhase, Role, TerminalState};
pub use error::{FlowError, FlowResult, HookError, HookResult};
pub use hooks::{HookChain, InitiatorHooks, NoopHooks, ResponderHooks};
pub use initiator::InitiatorFlow;
pub use registry::{Responder, ResponderRegistry};
pub use responder::ResponderFlow;

/// Protocol name under which the message exchange is registered.
pub const SEND_MESSAGE_PROTOCOL: &str = "send-message";
