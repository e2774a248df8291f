//! # Responder Session
//!
//! Answers one inbound exchange: validate, counter-sign, await finality.
//! Nothing is signed before both the local contract rules and the integrity
//! checks pass; any failure there goes back to the initiator as a
//! `Rejection` carrying the reason verbatim.

use crate::config::SessionConfig;
use crate::domain::{ResponderPhase, Role, TerminalState};
use crate::error::{FlowError, FlowResult};
use crate::hooks::{isolate, ResponderHooks};
use crate::registry::Responder;
use async_trait::async_trait;
use mx_01_contract::ContractRules;
use mx_02_finality::FinalityClient;
use mx_telemetry::{session_span, SESSIONS_FINISHED, SESSIONS_STARTED};
use shared_bus::{SessionChannel, SessionError, SessionMessage};
use shared_crypto::{verify_signed_transaction, PartyKeyPair};
use shared_types::{FinalizedRecord, SignedTransaction};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

pub const ID_MISMATCH: &str = "Transaction id does not match its content.";
pub const WRONG_AUTHORITY: &str = "Transaction names an unexpected finality authority.";
pub const NOT_ADDRESSED: &str = "Message is not addressed to this party.";
pub const NOT_FROM_INITIATOR: &str = "Message sender must be the session initiator.";

enum Step {
    Receive,
    PreSignValidate { proposal: SignedTransaction },
    CounterSign { proposal: SignedTransaction },
    AwaitFinality { signed: SignedTransaction },
    Complete { finalized: FinalizedRecord },
}

impl Step {
    fn phase(&self) -> ResponderPhase {
        match self {
            Step::Receive => ResponderPhase::Receive,
            Step::PreSignValidate { .. } => ResponderPhase::PreSignValidate,
            Step::CounterSign { .. } => ResponderPhase::CounterSign,
            Step::AwaitFinality { .. } => ResponderPhase::AwaitFinality,
            Step::Complete { .. } => ResponderPhase::Complete,
        }
    }
}

/// Responder side of the message exchange.
#[derive(Clone)]
pub struct ResponderFlow {
    keys: Arc<PartyKeyPair>,
    finality: FinalityClient,
    rules: ContractRules,
    hooks: Arc<dyn ResponderHooks>,
    config: SessionConfig,
}

impl ResponderFlow {
    pub fn new(
        keys: Arc<PartyKeyPair>,
        finality: FinalityClient,
        rules: ContractRules,
        hooks: Arc<dyn ResponderHooks>,
        config: SessionConfig,
    ) -> Self {
        Self {
            keys,
            finality,
            rules,
            hooks,
            config,
        }
    }

    /// Handle one inbound session to completion.
    pub async fn run(&self, mut session: SessionChannel) -> FlowResult<FinalizedRecord> {
        let span = session_span!(
            "responder",
            session_id = %session.session_id(),
            counterparty = %session.counterparty()
        );

        async move {
            SESSIONS_STARTED.with_label_values(&[Role::Responder.as_str()]).inc();
            let result = self.drive(&mut session).await;
            let outcome = match &result {
                Ok(finalized) => {
                    info!(tx_id = %finalized.id().short(), "Responder session completed");
                    TerminalState::Completed
                }
                Err(e) => {
                    warn!(error = %e, "Responder session failed");
                    e.terminal_state(Role::Responder)
                }
            };
            SESSIONS_FINISHED
                .with_label_values(&[Role::Responder.as_str(), outcome.as_str()])
                .inc();
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, session: &mut SessionChannel) -> FlowResult<FinalizedRecord> {
        let mut step = Step::Receive;
        loop {
            debug!(phase = %step.phase(), "Entering phase");
            step = match step {
                Step::Receive => {
                    let proposal = self.receive(session).await?;
                    Step::PreSignValidate { proposal }
                }
                Step::PreSignValidate { proposal } => {
                    isolate(
                        "before_counter_sign",
                        self.hooks.before_counter_sign(&proposal).await,
                    );
                    if let Err(e) = self.validate(&proposal, session) {
                        reject(session, &e).await;
                        return Err(e);
                    }
                    Step::CounterSign { proposal }
                }
                Step::CounterSign { proposal } => {
                    let signature = self.keys.sign_transaction(&proposal.id);
                    session
                        .send(SessionMessage::CounterSignature(signature))
                        .await
                        .map_err(channel_closed)?;
                    let signed =
                        proposal
                            .with_signature(signature)
                            .map_err(|e| FlowError::InvalidSignature {
                                reason: e.to_string(),
                            })?;
                    isolate(
                        "after_counter_signed",
                        self.hooks.after_counter_signed(&signed).await,
                    );
                    Step::AwaitFinality { signed }
                }
                Step::AwaitFinality { signed } => {
                    let finalized = self.finality.await_finality(session, &signed.id).await?;
                    Step::Complete { finalized }
                }
                Step::Complete { finalized } => {
                    isolate("after_committed", self.hooks.after_committed(&finalized).await);
                    return Ok(finalized);
                }
            };
        }
    }

    async fn receive(&self, session: &mut SessionChannel) -> FlowResult<SignedTransaction> {
        let message = session
            .receive_within(self.config.counter_signature_timeout)
            .await
            .map_err(channel_closed)?;
        match message {
            SessionMessage::Propose(proposal) => Ok(proposal),
            other => Err(FlowError::ProtocolViolation {
                reason: format!("expected a proposal, got {}", other.kind()),
            }),
        }
    }

    /// Everything that must hold before counter-signing.
    fn validate(&self, proposal: &SignedTransaction, session: &SessionChannel) -> FlowResult<()> {
        if !proposal.id_matches_content() {
            return Err(FlowError::InvalidTransition {
                reason: ID_MISMATCH.to_string(),
            });
        }
        if &proposal.transition.authority != self.finality.authority() {
            return Err(FlowError::InvalidTransition {
                reason: WRONG_AUTHORITY.to_string(),
            });
        }

        self.rules.verify(&proposal.transition)?;

        if let Some(record) = proposal.transition.single_output() {
            if record.recipient() != session.local() {
                return Err(FlowError::InvalidTransition {
                    reason: NOT_ADDRESSED.to_string(),
                });
            }
            if record.sender() != session.counterparty() {
                return Err(FlowError::InvalidTransition {
                    reason: NOT_FROM_INITIATOR.to_string(),
                });
            }
        }

        verify_signed_transaction(proposal, &[self.keys.public_key()]).map_err(|e| {
            FlowError::InvalidSignature {
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl Responder for ResponderFlow {
    async fn respond(&self, session: SessionChannel) -> FlowResult<FinalizedRecord> {
        self.run(session).await
    }
}

/// Tell the initiator why its proposal was declined.
async fn reject(session: &mut SessionChannel, error: &FlowError) {
    let reason = error.rejection_reason();
    warn!(%reason, "Rejecting proposal");
    if let Err(e) = session.send(SessionMessage::Rejection { reason }).await {
        warn!(error = %e, "Could not deliver rejection");
    }
}

fn channel_closed(e: SessionError) -> FlowError {
    FlowError::ChannelClosed {
        detail: e.to_string(),
    }
}

impl std::fmt::Debug for ResponderFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderFlow")
            .field("party", &self.keys.party().name)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
