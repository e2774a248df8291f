//! # Initiator Session
//!
//! Drives one exchange from a new record to its finalized result. The
//! session is an explicit phase value advanced one step per loop iteration;
//! it suspends only while waiting on the counterparty and on finality.

use crate::config::SessionConfig;
use crate::domain::{InitiatorPhase, Role, TerminalState};
use crate::error::{FlowError, FlowResult};
use crate::hooks::{isolate, InitiatorHooks};
use crate::SEND_MESSAGE_PROTOCOL;
use mx_01_contract::ContractRules;
use mx_02_finality::FinalityClient;
use mx_telemetry::{session_span, SESSIONS_FINISHED, SESSIONS_STARTED};
use shared_bus::{SessionChannel, SessionError, SessionMessage, SessionRouter};
use shared_crypto::{verify_signature, verify_signed_transaction, PartyKeyPair};
use shared_types::{
    FinalizedRecord, MessageRecord, Party, SignedTransaction, Transition, TransactionSignature,
};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

pub const NOT_SENDER: &str = "Initiator must be the sender of the message.";
pub const NOT_PRIOR_RECIPIENT: &str = "Only the recipient of a message may reply to it.";

/// Session state, carrying what the next phase needs.
enum Step {
    Build {
        record: MessageRecord,
        prior: Option<MessageRecord>,
    },
    SelfValidate {
        transition: Transition,
    },
    SelfSign {
        transition: Transition,
    },
    OpenSession {
        stx: SignedTransaction,
    },
    CollectCounterSignature {
        stx: SignedTransaction,
        session: SessionChannel,
    },
    SubmitFinality {
        stx: SignedTransaction,
        session: SessionChannel,
    },
    Complete {
        finalized: FinalizedRecord,
    },
}

impl Step {
    fn phase(&self) -> InitiatorPhase {
        match self {
            Step::Build { .. } => InitiatorPhase::Build,
            Step::SelfValidate { .. } => InitiatorPhase::SelfValidate,
            Step::SelfSign { .. } => InitiatorPhase::SelfSign,
            Step::OpenSession { .. } => InitiatorPhase::OpenSession,
            Step::CollectCounterSignature { .. } => InitiatorPhase::CollectCounterSignature,
            Step::SubmitFinality { .. } => InitiatorPhase::SubmitFinality,
            Step::Complete { .. } => InitiatorPhase::Complete,
        }
    }
}

/// Initiator side of the message exchange.
///
/// One value serves any number of sessions; each `run` owns its own state.
#[derive(Clone)]
pub struct InitiatorFlow {
    keys: Arc<PartyKeyPair>,
    router: Arc<dyn SessionRouter>,
    finality: FinalityClient,
    rules: ContractRules,
    hooks: Arc<dyn InitiatorHooks>,
    config: SessionConfig,
}

impl InitiatorFlow {
    pub fn new(
        keys: Arc<PartyKeyPair>,
        router: Arc<dyn SessionRouter>,
        finality: FinalityClient,
        rules: ContractRules,
        hooks: Arc<dyn InitiatorHooks>,
        config: SessionConfig,
    ) -> Self {
        Self {
            keys,
            router,
            finality,
            rules,
            hooks,
            config,
        }
    }

    /// Send `record` to its recipient.
    pub async fn run(&self, record: MessageRecord) -> FlowResult<FinalizedRecord> {
        self.execute(record, None).await
    }

    /// Answer `prior` with `record`, consuming `prior`.
    pub async fn run_reply(
        &self,
        prior: MessageRecord,
        record: MessageRecord,
    ) -> FlowResult<FinalizedRecord> {
        self.execute(record, Some(prior)).await
    }

    async fn execute(
        &self,
        record: MessageRecord,
        prior: Option<MessageRecord>,
    ) -> FlowResult<FinalizedRecord> {
        let span = session_span!(
            "initiator",
            record_id = %record.id(),
            counterparty = %record.recipient(),
            session_id = tracing::field::Empty
        );

        async move {
            SESSIONS_STARTED.with_label_values(&[Role::Initiator.as_str()]).inc();
            let result = self.drive(Step::Build { record, prior }).await;
            let outcome = match &result {
                Ok(finalized) => {
                    info!(tx_id = %finalized.id().short(), "Initiator session completed");
                    TerminalState::Completed
                }
                Err(e) => {
                    warn!(error = %e, "Initiator session failed");
                    e.terminal_state(Role::Initiator)
                }
            };
            SESSIONS_FINISHED
                .with_label_values(&[Role::Initiator.as_str(), outcome.as_str()])
                .inc();
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, mut step: Step) -> FlowResult<FinalizedRecord> {
        loop {
            debug!(phase = %step.phase(), "Entering phase");
            step = match step {
                Step::Build { record, prior } => self.build(record, prior).await?,
                Step::SelfValidate { transition } => {
                    self.rules.verify(&transition)?;
                    Step::SelfSign { transition }
                }
                Step::SelfSign { transition } => self.self_sign(transition)?,
                Step::OpenSession { stx } => self.open_session(stx).await?,
                Step::CollectCounterSignature { stx, session } => {
                    self.collect_counter_signature(stx, session).await?
                }
                Step::SubmitFinality { stx, mut session } => {
                    let finalized = self
                        .finality
                        .submit(&stx, std::slice::from_mut(&mut session))
                        .await?;
                    Step::Complete { finalized }
                }
                Step::Complete { finalized } => {
                    isolate("after_committed", self.hooks.after_committed(&finalized).await);
                    return Ok(finalized);
                }
            };
        }
    }

    async fn build(&self, record: MessageRecord, prior: Option<MessageRecord>) -> FlowResult<Step> {
        let me = self.keys.party();
        if record.sender() != &me {
            return Err(FlowError::InvalidTransition {
                reason: NOT_SENDER.to_string(),
            });
        }
        if let Some(prior) = &prior {
            if prior.recipient() != &me {
                return Err(FlowError::InvalidTransition {
                    reason: NOT_PRIOR_RECIPIENT.to_string(),
                });
            }
        }

        isolate("before_build", self.hooks.before_build(&record).await);

        let authority = self.finality.authority().clone();
        let transition = match prior {
            None => Transition::send(record, authority),
            Some(prior) => Transition::reply(prior, record, authority),
        };
        Ok(Step::SelfValidate { transition })
    }

    fn self_sign(&self, transition: Transition) -> FlowResult<Step> {
        let stx = SignedTransaction::new(transition);
        let signature = self.keys.sign_transaction(&stx.id);
        let stx = stx
            .with_signature(signature)
            .map_err(|e| FlowError::InvalidSignature {
                reason: e.to_string(),
            })?;
        debug!(tx_id = %stx.id.short(), "Self-signed");
        Ok(Step::OpenSession { stx })
    }

    async fn open_session(&self, stx: SignedTransaction) -> FlowResult<Step> {
        isolate(
            "before_signature_request",
            self.hooks.before_signature_request(&stx).await,
        );

        let counterparty = counterparty_of(&stx)?;
        let mut session = self
            .router
            .open_session(&self.keys.party(), &counterparty, SEND_MESSAGE_PROTOCOL)
            .await
            .map_err(channel_closed)?;
        tracing::Span::current().record("session_id", tracing::field::display(session.session_id()));

        session
            .send(SessionMessage::Propose(stx.clone()))
            .await
            .map_err(channel_closed)?;
        Ok(Step::CollectCounterSignature { stx, session })
    }

    async fn collect_counter_signature(
        &self,
        stx: SignedTransaction,
        mut session: SessionChannel,
    ) -> FlowResult<Step> {
        let message = session
            .receive_within(self.config.counter_signature_timeout)
            .await
            .map_err(|e| match e {
                SessionError::Timeout { millis } => FlowError::CounterSignatureTimeout { millis },
                other => channel_closed(other),
            })?;

        let signature = match message {
            SessionMessage::CounterSignature(signature) => signature,
            SessionMessage::Rejection { reason } => {
                return Err(FlowError::CounterpartyRejected { reason })
            }
            other => {
                return Err(FlowError::ProtocolViolation {
                    reason: format!("expected a counter-signature, got {}", other.kind()),
                })
            }
        };

        let stx = self.accept_counter_signature(stx, signature, session.counterparty())?;
        isolate(
            "after_signature_collected",
            self.hooks.after_signature_collected(&stx).await,
        );
        Ok(Step::SubmitFinality { stx, session })
    }

    fn accept_counter_signature(
        &self,
        stx: SignedTransaction,
        signature: TransactionSignature,
        counterparty: &Party,
    ) -> FlowResult<SignedTransaction> {
        if signature.by != counterparty.owning_key {
            return Err(FlowError::InvalidSignature {
                reason: format!("counter-signature is not from {counterparty}"),
            });
        }
        verify_signature(stx.id.as_bytes(), &signature).map_err(|e| {
            FlowError::InvalidSignature {
                reason: e.to_string(),
            }
        })?;
        let stx = stx
            .with_signature(signature)
            .map_err(|e| FlowError::InvalidSignature {
                reason: e.to_string(),
            })?;
        verify_signed_transaction(&stx, &[]).map_err(|e| FlowError::InvalidSignature {
            reason: e.to_string(),
        })?;
        Ok(stx)
    }
}

/// The recipient of the produced record.
fn counterparty_of(stx: &SignedTransaction) -> FlowResult<Party> {
    stx.transition
        .single_output()
        .map(|record| record.recipient().clone())
        .ok_or_else(|| FlowError::ProtocolViolation {
            reason: "transition has no single output".to_string(),
        })
}

fn channel_closed(e: SessionError) -> FlowError {
    FlowError::ChannelClosed {
        detail: e.to_string(),
    }
}

impl std::fmt::Debug for InitiatorFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitiatorFlow")
            .field("party", &self.keys.party().name)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
