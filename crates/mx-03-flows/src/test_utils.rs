//! Shared fixtures for session tests.

use crate::config::SessionConfig;
use crate::hooks::NoopHooks;
use crate::initiator::InitiatorFlow;
use crate::responder::ResponderFlow;
use mx_01_contract::ContractRules;
use mx_02_finality::{FinalityClient, FinalityConfig, NotaryService};
use shared_bus::{InMemorySessionRouter, SessionChannel, SessionInbox, SessionRouter};
use shared_crypto::PartyKeyPair;
use shared_types::{MessageRecord, RecordId};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct Network {
    pub alice: Arc<PartyKeyPair>,
    pub bob: Arc<PartyKeyPair>,
    pub router: Arc<InMemorySessionRouter>,
    pub finality: FinalityClient,
    pub config: SessionConfig,
}

impl Network {
    pub fn new() -> Self {
        let notary = Arc::new(NotaryService::new(
            PartyKeyPair::generate("Notary"),
            FinalityConfig::default(),
        ));
        Self {
            alice: Arc::new(PartyKeyPair::generate("PartyA")),
            bob: Arc::new(PartyKeyPair::generate("PartyB")),
            router: Arc::new(InMemorySessionRouter::new()),
            finality: FinalityClient::new(notary, Duration::from_secs(2)),
            config: SessionConfig {
                counter_signature_timeout: Duration::from_millis(500),
            },
        }
    }

    pub fn initiator(&self, rules: ContractRules) -> InitiatorFlow {
        InitiatorFlow::new(
            self.alice.clone(),
            self.router.clone(),
            self.finality.clone(),
            rules,
            Arc::new(NoopHooks),
            self.config.clone(),
        )
    }

    pub fn responder(&self, rules: ContractRules) -> ResponderFlow {
        ResponderFlow::new(
            self.bob.clone(),
            self.finality.clone(),
            rules,
            Arc::new(NoopHooks),
            self.config.clone(),
        )
    }

    pub fn bob_inbox(&self) -> SessionInbox {
        self.router.register(self.bob.party())
    }

    /// A session opened by Alice, and Bob's end of it.
    pub async fn session(&self) -> (SessionChannel, SessionChannel) {
        let mut inbox = self.bob_inbox();
        let alice_end = self
            .router
            .open_session(&self.alice.party(), &self.bob.party(), crate::SEND_MESSAGE_PROTOCOL)
            .await
            .unwrap();
        let bob_end = inbox.accept().await.unwrap().channel;
        (alice_end, bob_end)
    }

    pub fn message(&self, contents: &str) -> MessageRecord {
        MessageRecord::new(self.alice.party(), self.bob.party(), contents, RecordId::new())
    }
}
