//! # Node
//!
//! One party on the message-exchange network.
//!
//! ## Responsibilities
//!
//! - Accept inbound sessions and hand each to the responder registered for
//!   its protocol, one task per session
//! - Start exchanges on request (`send_message`, `reply_to`)
//! - Broadcast the outcome of every session it answered

use crate::container::{NodeComponents, NodeConfig};
use crate::error::{NodeError, NodeResult};
use mx_02_finality::{FinalityAuthority, FinalityClient};
use mx_03_flows::{
    FlowError, FlowResult, InitiatorFlow, ResponderFlow, ResponderRegistry, SEND_MESSAGE_PROTOCOL,
};
use mx_04_extensions::InMemoryMessageRepository;
use shared_bus::{InMemorySessionRouter, InboundSession, SessionInbox};
use shared_crypto::PartyKeyPair;
use shared_types::{FinalizedRecord, MessageRecord, Party, RecordId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Buffered outcomes per subscriber before the slowest starts lagging.
const OUTCOME_BUFFER: usize = 256;

pub const NOTHING_TO_REPLY_TO: &str = "Finalized transaction produced no message to reply to.";

/// Result of one inbound session.
#[derive(Debug, Clone)]
pub struct ResponderOutcome {
    pub session_id: Uuid,
    pub protocol: String,
    pub counterparty: Party,
    pub result: FlowResult<FinalizedRecord>,
}

/// A running party.
pub struct Node {
    config: NodeConfig,
    keys: Arc<PartyKeyPair>,
    router: Arc<InMemorySessionRouter>,
    registry: Arc<ResponderRegistry>,
    initiator: InitiatorFlow,
    repository: Option<Arc<InMemoryMessageRepository>>,
    outcomes: broadcast::Sender<ResponderOutcome>,
    started: AtomicBool,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl Node {
    /// Build a node on `router`, finalizing through `authority`.
    ///
    /// The send-message responder is registered; the node does not accept
    /// sessions until [`Node::start`].
    pub fn new(
        config: NodeConfig,
        router: Arc<InMemorySessionRouter>,
        authority: Arc<dyn FinalityAuthority>,
    ) -> NodeResult<Self> {
        let components = NodeComponents::build(&config)?;
        let NodeComponents {
            keys,
            rules,
            initiator_hooks,
            responder_hooks,
            repository,
        } = components;

        let finality = FinalityClient::new(authority, config.session.finality_timeout);
        let session_config = config.session_config();

        let responder = ResponderFlow::new(
            keys.clone(),
            finality.clone(),
            rules.clone(),
            responder_hooks,
            session_config.clone(),
        );
        let registry = Arc::new(ResponderRegistry::new());
        registry.register(SEND_MESSAGE_PROTOCOL, Arc::new(responder));

        let initiator = InitiatorFlow::new(
            keys.clone(),
            router.clone(),
            finality,
            rules,
            initiator_hooks,
            session_config,
        );

        let (outcomes, _) = broadcast::channel(OUTCOME_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            keys,
            router,
            registry,
            initiator,
            repository,
            outcomes,
            started: AtomicBool::new(false),
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn party(&self) -> Party {
        self.keys.party()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Responders by protocol. Registering again overrides the default.
    pub fn registry(&self) -> &ResponderRegistry {
        &self.registry
    }

    /// The message repository, when persistence is enabled.
    pub fn repository(&self) -> Option<&Arc<InMemoryMessageRepository>> {
        self.repository.as_ref()
    }

    /// Look up another party on the same network by name.
    pub fn lookup_party(&self, name: &str) -> Option<Party> {
        self.router.resolve_party(name)
    }

    /// Subscribe to the outcome of every inbound session handled from now on.
    pub fn responder_outcomes(&self) -> broadcast::Receiver<ResponderOutcome> {
        self.outcomes.subscribe()
    }

    /// Register this node's inbox and start accepting sessions.
    pub fn start(&self) -> NodeResult<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(NodeError::AlreadyStarted {
                name: self.config.identity.name.clone(),
            });
        }

        let inbox = self.router.register(self.keys.party());
        info!(party = %self.keys.party(), protocols = ?self.registry.protocols(), "Node accepting sessions");

        Ok(tokio::spawn(accept_loop(
            inbox,
            self.registry.clone(),
            self.outcomes.clone(),
            self.shutdown_rx.clone(),
        )))
    }

    /// Send `contents` to `recipient` as a new message.
    pub async fn send_message(
        &self,
        recipient: &Party,
        contents: impl Into<String>,
    ) -> FlowResult<FinalizedRecord> {
        let record =
            MessageRecord::new(self.keys.party(), recipient.clone(), contents, RecordId::new());
        debug!(record_id = %record.id(), recipient = %recipient, "Sending message");
        self.initiator.run(record).await
    }

    /// Answer the message finalized in `finalized`, consuming it.
    ///
    /// Only the recipient of that message may answer it.
    pub async fn reply_to(
        &self,
        finalized: &FinalizedRecord,
        contents: impl Into<String>,
    ) -> FlowResult<FinalizedRecord> {
        let prior = finalized
            .record()
            .cloned()
            .ok_or_else(|| FlowError::InvalidTransition {
                reason: NOTHING_TO_REPLY_TO.to_string(),
            })?;
        let record = prior.reply(contents, RecordId::new());
        debug!(
            record_id = %record.id(),
            in_reply_to = %prior.id(),
            recipient = %record.recipient(),
            "Replying to message"
        );
        self.initiator.run_reply(prior, record).await
    }

    /// Stop accepting sessions. Sessions already running finish on their own.
    pub fn shutdown(&self) {
        info!(party = %self.keys.party(), "Initiating node shutdown");
        if let Err(e) = self.shutdown_tx.send(true) {
            warn!(error = %e, "Failed to send shutdown signal");
        }
        self.router.deregister(&self.keys.party());
    }
}

async fn accept_loop(
    mut inbox: SessionInbox,
    registry: Arc<ResponderRegistry>,
    outcomes: broadcast::Sender<ResponderOutcome>,
    mut shutdown: watch::Receiver<bool>,
) {
    let party = inbox.party().clone();
    loop {
        let inbound = tokio::select! {
            inbound = inbox.accept() => match inbound {
                Some(inbound) => inbound,
                None => {
                    info!(party = %party, "Session inbox closed");
                    break;
                }
            },
            _ = shutdown.changed() => {
                info!(party = %party, "Shutdown signal received");
                break;
            }
        };

        let InboundSession { protocol, channel } = inbound;
        let session_id = channel.session_id();

        let Some(responder) = registry.resolve(&protocol) else {
            warn!(
                session_id = %session_id,
                protocol = %protocol,
                counterparty = %channel.counterparty(),
                "No responder registered, closing session"
            );
            continue;
        };

        let outcomes = outcomes.clone();
        tokio::spawn(async move {
            let counterparty = channel.counterparty().clone();
            let result = responder.respond(channel).await;
            // Nobody listening is fine.
            let _ = outcomes.send(ResponderOutcome {
                session_id,
                protocol,
                counterparty,
                result,
            });
        });
    }
}
