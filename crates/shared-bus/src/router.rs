//! # Session Router
//!
//! Opens sessions between parties and delivers the responder's end to the
//! responder's inbox.

use crate::events::InboundSession;
use crate::session::{SessionChannel, SessionError};
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_INBOX_CAPACITY};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Party;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Trait for opening sessions to a counterparty.
///
/// This is the only way an initiator reaches a responder.
#[async_trait]
pub trait SessionRouter: Send + Sync {
    /// Open a new session from `from` to `to` for `protocol`.
    ///
    /// # Returns
    ///
    /// The initiator's end of the session. The responder's end has already
    /// been queued in the responder's inbox.
    async fn open_session(
        &self,
        from: &Party,
        to: &Party,
        protocol: &str,
    ) -> Result<SessionChannel, SessionError>;
}

/// Receiving side of a party's inbound sessions.
pub struct SessionInbox {
    party: Party,
    receiver: mpsc::Receiver<InboundSession>,
}

impl SessionInbox {
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Wait for the next inbound session.
    ///
    /// # Returns
    ///
    /// - `Some(session)` - A remote initiator opened a session
    /// - `None` - The party was deregistered or the router dropped
    pub async fn accept(&mut self) -> Option<InboundSession> {
        self.receiver.recv().await
    }
}

/// In-memory implementation of the session router.
///
/// Suitable for single-process deployments and tests; a networked deployment
/// would put a transport behind the same trait.
pub struct InMemorySessionRouter {
    /// Inbox senders by party name.
    inboxes: RwLock<HashMap<String, (Party, mpsc::Sender<InboundSession>)>>,

    /// Total sessions opened.
    sessions_opened: AtomicU64,

    /// Per-direction channel capacity.
    capacity: usize,
}

impl InMemorySessionRouter {
    /// Create a new router with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new router with specified per-session capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inboxes: RwLock::new(HashMap::new()),
            sessions_opened: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register `party` and return its inbox.
    ///
    /// A second registration under the same name replaces the first; the old
    /// inbox then sees no further sessions.
    pub fn register(&self, party: Party) -> SessionInbox {
        let (sender, receiver) = mpsc::channel(DEFAULT_INBOX_CAPACITY);
        let previous = self
            .inboxes
            .write()
            .insert(party.name.clone(), (party.clone(), sender));
        if previous.is_some() {
            warn!(party = %party, "Replaced existing session inbox");
        } else {
            info!(party = %party, "Session inbox registered");
        }
        SessionInbox { party, receiver }
    }

    /// Remove `party`'s inbox. Returns whether one was registered.
    pub fn deregister(&self, party: &Party) -> bool {
        self.inboxes.write().remove(&party.name).is_some()
    }

    /// Check whether a party has a registered inbox.
    #[must_use]
    pub fn is_registered(&self, party: &Party) -> bool {
        self.inboxes
            .read()
            .get(&party.name)
            .is_some_and(|(registered, _)| registered == party)
    }

    /// Look up a registered party by name.
    #[must_use]
    pub fn resolve_party(&self, name: &str) -> Option<Party> {
        self.inboxes
            .read()
            .get(name)
            .map(|(registered, _)| registered.clone())
    }

    /// Get the total number of sessions opened.
    #[must_use]
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    /// Get the per-direction channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemorySessionRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRouter for InMemorySessionRouter {
    async fn open_session(
        &self,
        from: &Party,
        to: &Party,
        protocol: &str,
    ) -> Result<SessionChannel, SessionError> {
        // Clone the sender out so the lock is not held across the await.
        let inbox = {
            let inboxes = self.inboxes.read();
            match inboxes.get(&to.name) {
                Some((registered, sender)) if registered == to => sender.clone(),
                _ => {
                    return Err(SessionError::UnknownParty {
                        name: to.name.clone(),
                    })
                }
            }
        };

        let (initiator_end, responder_end) =
            SessionChannel::pair(from.clone(), to.clone(), self.capacity);
        let session_id = initiator_end.session_id();

        inbox
            .send(InboundSession {
                protocol: protocol.to_string(),
                channel: responder_end,
            })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;

        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
        debug!(
            session_id = %session_id,
            from = %from,
            to = %to,
            protocol,
            "Session opened"
        );
        Ok(initiator_end)
    }
}
