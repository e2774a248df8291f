//! Shared fixtures: two parties and a notary on one in-memory router.

use async_trait::async_trait;
use mx_01_contract::ContractRules;
use mx_02_finality::{FinalityClient, FinalityConfig, NotaryService};
use mx_03_flows::{
    FlowError, FlowResult, HookResult, InitiatorFlow, InitiatorHooks, NoopHooks, Responder,
    ResponderFlow, ResponderHooks, SessionConfig,
};
use parking_lot::Mutex;
use shared_bus::InMemorySessionRouter;
use shared_crypto::PartyKeyPair;
use shared_types::{FinalizedRecord, MessageRecord, RecordId, SignedTransaction};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound on any single step of a scenario.
pub const GUARD: Duration = Duration::from_secs(5);

/// Await `future`, failing the test if it takes longer than [`GUARD`].
pub async fn guarded<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(GUARD, future)
        .await
        .expect("scenario step timed out")
}

pub struct Exchange {
    pub alice: Arc<PartyKeyPair>,
    pub bob: Arc<PartyKeyPair>,
    pub notary: Arc<NotaryService>,
    pub router: Arc<InMemorySessionRouter>,
    pub finality: FinalityClient,
    pub config: SessionConfig,
}

impl Exchange {
    pub fn new() -> Self {
        let notary = Arc::new(NotaryService::new(
            PartyKeyPair::generate("Notary"),
            FinalityConfig::default(),
        ));
        Self {
            alice: Arc::new(PartyKeyPair::generate("PartyA")),
            bob: Arc::new(PartyKeyPair::generate("PartyB")),
            router: Arc::new(InMemorySessionRouter::new()),
            finality: FinalityClient::new(notary.clone(), Duration::from_secs(2)),
            notary,
            config: SessionConfig {
                counter_signature_timeout: Duration::from_secs(1),
            },
        }
    }

    pub fn initiator(
        &self,
        keys: &Arc<PartyKeyPair>,
        rules: ContractRules,
        hooks: Arc<dyn InitiatorHooks>,
    ) -> InitiatorFlow {
        InitiatorFlow::new(
            keys.clone(),
            self.router.clone(),
            self.finality.clone(),
            rules,
            hooks,
            self.config.clone(),
        )
    }

    pub fn plain_initiator(&self, keys: &Arc<PartyKeyPair>) -> InitiatorFlow {
        self.initiator(keys, ContractRules::new(), Arc::new(NoopHooks))
    }

    pub fn responder(
        &self,
        keys: &Arc<PartyKeyPair>,
        rules: ContractRules,
        hooks: Arc<dyn ResponderHooks>,
    ) -> Arc<ResponderFlow> {
        Arc::new(ResponderFlow::new(
            keys.clone(),
            self.finality.clone(),
            rules,
            hooks,
            self.config.clone(),
        ))
    }

    pub fn plain_responder(&self, keys: &Arc<PartyKeyPair>) -> Arc<ResponderFlow> {
        self.responder(keys, ContractRules::new(), Arc::new(NoopHooks))
    }

    /// Register `keys` and answer its next `sessions` inbound sessions with
    /// `responder`, in order.
    pub fn serve(
        &self,
        keys: &Arc<PartyKeyPair>,
        responder: Arc<dyn Responder>,
        sessions: usize,
    ) -> JoinHandle<Vec<FlowResult<FinalizedRecord>>> {
        let mut inbox = self.router.register(keys.party());
        tokio::spawn(async move {
            let mut results = Vec::with_capacity(sessions);
            for _ in 0..sessions {
                let result = match inbox.accept().await {
                    Some(inbound) => responder.respond(inbound.channel).await,
                    None => Err(FlowError::ChannelClosed {
                        detail: "inbox closed".to_string(),
                    }),
                };
                results.push(result);
            }
            results
        })
    }

    /// A message from Alice to Bob.
    pub fn message(&self, contents: &str) -> MessageRecord {
        MessageRecord::new(self.alice.party(), self.bob.party(), contents, RecordId::new())
    }
}

/// Records every hook invocation as `"<side>:<hook>"`.
#[derive(Clone)]
pub struct RecordingHooks {
    side: &'static str,
    trace: Arc<Mutex<Vec<String>>>,
}

impl RecordingHooks {
    pub fn new(side: &'static str, trace: Arc<Mutex<Vec<String>>>) -> Self {
        Self { side, trace }
    }

    fn record(&self, hook: &str) -> HookResult {
        self.trace.lock().push(format!("{}:{}", self.side, hook));
        Ok(())
    }
}

#[async_trait]
impl InitiatorHooks for RecordingHooks {
    async fn before_build(&self, _record: &MessageRecord) -> HookResult {
        self.record("before_build")
    }

    async fn before_signature_request(&self, _transaction: &SignedTransaction) -> HookResult {
        self.record("before_signature_request")
    }

    async fn after_signature_collected(&self, _transaction: &SignedTransaction) -> HookResult {
        self.record("after_signature_collected")
    }

    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        self.record("after_committed")
    }
}

#[async_trait]
impl ResponderHooks for RecordingHooks {
    async fn before_counter_sign(&self, _transaction: &SignedTransaction) -> HookResult {
        self.record("before_counter_sign")
    }

    async fn after_counter_signed(&self, _transaction: &SignedTransaction) -> HookResult {
        self.record("after_counter_signed")
    }

    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        self.record("after_committed")
    }
}
