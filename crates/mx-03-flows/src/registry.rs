//! Responder registry
//!
//! Maps a protocol name to the responder that answers it. The registry is
//! consulted once per accepted session.
//!
//! A registered [`Responder`] acts as the factory for its protocol: every
//! `respond` call builds that session's state from scratch, so one shared
//! instance serves any number of concurrent sessions.

use crate::error::FlowResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::SessionChannel;
use shared_types::FinalizedRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Something that can answer an inbound session.
///
/// Each call handles exactly one session with fresh per-session state.
/// Implementations keep nothing between calls except shared, read-only
/// dependencies such as keys, rules and hooks.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, session: SessionChannel) -> FlowResult<FinalizedRecord>;
}

/// Protocol name -> responder
#[derive(Default)]
pub struct ResponderRegistry {
    responders: RwLock<HashMap<String, Arc<dyn Responder>>>,
}

impl ResponderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `responder` for `protocol`.
    ///
    /// Replaces, and returns, any responder already registered for it.
    pub fn register(
        &self,
        protocol: impl Into<String>,
        responder: Arc<dyn Responder>,
    ) -> Option<Arc<dyn Responder>> {
        let protocol = protocol.into();
        let previous = self.responders.write().insert(protocol.clone(), responder);
        info!(
            protocol = %protocol,
            overriding = previous.is_some(),
            "Responder registered"
        );
        previous
    }

    pub fn resolve(&self, protocol: &str) -> Option<Arc<dyn Responder>> {
        self.responders.read().get(protocol).cloned()
    }

    pub fn protocols(&self) -> Vec<String> {
        let mut names: Vec<String> = self.responders.read().keys().cloned().collect();
        names.sort();
        names
    }
}
