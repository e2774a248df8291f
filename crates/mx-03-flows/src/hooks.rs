//! # Hook Set
//!
//! Optional observers fired at fixed points of a session. Every method
//! defaults to a no-op, so a variant implements only what it needs.
//!
//! Hooks see the protocol's data but cannot change it. A failing hook is
//! logged and counted in `mx_hook_failures_total`; the session carries on.

use crate::error::HookResult;
use async_trait::async_trait;
use mx_telemetry::HOOK_FAILURES;
use shared_types::{FinalizedRecord, MessageRecord, SignedTransaction};
use std::sync::Arc;
use tracing::warn;

/// Initiator-side extension points, in firing order.
#[async_trait]
pub trait InitiatorHooks: Send + Sync {
    /// Before the transition is built from `record`.
    async fn before_build(&self, _record: &MessageRecord) -> HookResult {
        Ok(())
    }

    /// After self-signing, before the transaction is sent to the counterparty.
    async fn before_signature_request(&self, _transaction: &SignedTransaction) -> HookResult {
        Ok(())
    }

    /// After the counter-signature arrived and verified.
    async fn after_signature_collected(&self, _transaction: &SignedTransaction) -> HookResult {
        Ok(())
    }

    /// After the authority certified the transaction.
    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        Ok(())
    }
}

/// Responder-side extension points, in firing order.
#[async_trait]
pub trait ResponderHooks: Send + Sync {
    /// Before any validation of the received proposal.
    async fn before_counter_sign(&self, _transaction: &SignedTransaction) -> HookResult {
        Ok(())
    }

    /// Right after the counter-signature was sent.
    async fn after_counter_signed(&self, _transaction: &SignedTransaction) -> HookResult {
        Ok(())
    }

    /// After the finalized record for the signed transaction arrived.
    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl InitiatorHooks for NoopHooks {}
impl ResponderHooks for NoopHooks {}

/// Log and count a hook failure.
pub(crate) fn isolate(hook: &'static str, result: HookResult) {
    if let Err(e) = result {
        HOOK_FAILURES.with_label_values(&[hook]).inc();
        warn!(hook, error = %e, "Hook failed; continuing");
    }
}

/// Several hook implementations run in registration order.
///
/// Each member is isolated from the others: one failing member does not stop
/// the rest.
pub struct HookChain<H: ?Sized> {
    members: Vec<Arc<H>>,
}

impl<H: ?Sized> HookChain<H> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, hooks: Arc<H>) -> Self {
        self.members.push(hooks);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InitiatorHooks for HookChain<dyn InitiatorHooks> {
    async fn before_build(&self, record: &MessageRecord) -> HookResult {
        for hooks in &self.members {
            isolate("before_build", hooks.before_build(record).await);
        }
        Ok(())
    }

    async fn before_signature_request(&self, transaction: &SignedTransaction) -> HookResult {
        for hooks in &self.members {
            isolate(
                "before_signature_request",
                hooks.before_signature_request(transaction).await,
            );
        }
        Ok(())
    }

    async fn after_signature_collected(&self, transaction: &SignedTransaction) -> HookResult {
        for hooks in &self.members {
            isolate(
                "after_signature_collected",
                hooks.after_signature_collected(transaction).await,
            );
        }
        Ok(())
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        for hooks in &self.members {
            isolate("after_committed", hooks.after_committed(finalized).await);
        }
        Ok(())
    }
}

#[async_trait]
impl ResponderHooks for HookChain<dyn ResponderHooks> {
    async fn before_counter_sign(&self, transaction: &SignedTransaction) -> HookResult {
        for hooks in &self.members {
            isolate(
                "before_counter_sign",
                hooks.before_counter_sign(transaction).await,
            );
        }
        Ok(())
    }

    async fn after_counter_signed(&self, transaction: &SignedTransaction) -> HookResult {
        for hooks in &self.members {
            isolate(
                "after_counter_signed",
                hooks.after_counter_signed(transaction).await,
            );
        }
        Ok(())
    }

    async fn after_committed(&self, finalized: &FinalizedRecord) -> HookResult {
        for hooks in &self.members {
            isolate("after_committed", hooks.after_committed(finalized).await);
        }
        Ok(())
    }
}
