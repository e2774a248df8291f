//! # Node Components
//!
//! ## Wiring
//!
//! ```text
//! NodeConfig ──→ identity.seed ──────────────→ PartyKeyPair
//!            ──→ extensions.required_phrase ─→ ContractRules + RequiredPhrase
//!            ──→ extensions.persistence ─────→ PersistenceHooks  ┐
//!            ──→ extensions.acknowledgements → NotificationHooks ┴→ HookChain (both roles)
//! ```
//!
//! Persistence runs before notification so a stored row exists by the time
//! an acknowledgement goes out.

use super::config::NodeConfig;
use crate::error::NodeResult;
use mx_01_contract::ContractRules;
use mx_03_flows::{HookChain, InitiatorHooks, ResponderHooks};
use mx_04_extensions::{
    InMemoryMessageRepository, MessageAcknowledger, NotificationHooks, PersistenceHooks,
    RequiredPhrase,
};
use shared_crypto::PartyKeyPair;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything a node needs besides the network.
pub struct NodeComponents {
    pub keys: Arc<PartyKeyPair>,
    pub rules: ContractRules,
    pub initiator_hooks: Arc<dyn InitiatorHooks>,
    pub responder_hooks: Arc<dyn ResponderHooks>,
    /// Present when the persistence variant is enabled.
    pub repository: Option<Arc<InMemoryMessageRepository>>,
}

impl NodeComponents {
    /// Build components from a validated configuration.
    #[instrument(skip_all, fields(node = %config.identity.name))]
    pub fn build(config: &NodeConfig) -> NodeResult<Self> {
        config.validate()?;

        let name = config.identity.name.clone();
        let keys = Arc::new(match config.identity.seed {
            Some(seed) => PartyKeyPair::from_seed(name, seed),
            None => PartyKeyPair::generate(name),
        });

        let mut rules = ContractRules::new();
        if let Some(phrase) = &config.extensions.required_phrase {
            rules = rules.with_predicate(Arc::new(RequiredPhrase::new(phrase.clone())));
        }

        let mut initiator_chain: HookChain<dyn InitiatorHooks> = HookChain::new();
        let mut responder_chain: HookChain<dyn ResponderHooks> = HookChain::new();

        let repository = if config.extensions.persistence {
            let repository = Arc::new(InMemoryMessageRepository::new());
            let hooks = Arc::new(PersistenceHooks::new(repository.clone()));
            initiator_chain = initiator_chain.with(hooks.clone());
            responder_chain = responder_chain.with(hooks);
            Some(repository)
        } else {
            None
        };

        if let Some(ack_config) = &config.extensions.acknowledgements {
            let acknowledger = Arc::new(MessageAcknowledger::new(ack_config.clone())?);
            let hooks = Arc::new(NotificationHooks::new(acknowledger));
            initiator_chain = initiator_chain.with(hooks.clone());
            responder_chain = responder_chain.with(hooks);
        }

        info!(
            party = %keys.party(),
            predicates = ?rules.predicate_names(),
            initiator_hooks = initiator_chain.len(),
            responder_hooks = responder_chain.len(),
            "Node components built"
        );

        Ok(Self {
            keys,
            rules,
            initiator_hooks: Arc::new(initiator_chain),
            responder_hooks: Arc::new(responder_chain),
            repository,
        })
    }
}
