//! Notary Service - in-memory Finality Authority

use crate::adapters::SystemClock;
use crate::error::{FinalityError, FinalityResult};
use crate::ports::inbound::FinalityAuthority;
use crate::ports::outbound::TimeSource;
use async_trait::async_trait;
use mx_telemetry::FINALITY_CERTIFICATES;
use parking_lot::RwLock;
use shared_crypto::{verify_signed_transaction, PartyKeyPair};
use shared_types::{
    FinalityCertificate, MessageRecord, Party, RecordId, SignedTransaction, TransactionId,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Finality configuration
#[derive(Clone, Debug)]
pub struct FinalityConfig {
    /// Re-verify every participant signature before certifying (zero-trust).
    ///
    /// When disabled, only the presence of every required signer is checked.
    pub verify_signatures: bool,
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            verify_signatures: true,
        }
    }
}

/// Internal state for certification
#[derive(Default)]
struct NotaryState {
    /// Records produced by certified transactions
    produced: HashMap<RecordId, MessageRecord>,
    /// Consumed record -> transaction that consumed it
    consumed: HashMap<RecordId, TransactionId>,
    /// Issued certificates by transaction
    certified: HashMap<TransactionId, FinalityCertificate>,
    /// Last sequence number issued
    last_sequence: u64,
}

/// In-memory notary.
///
/// Orders transactions by a monotonically increasing sequence number. A
/// transaction may only consume records that an earlier certified
/// transaction produced, each at most once.
pub struct NotaryService<C: TimeSource = SystemClock> {
    config: FinalityConfig,
    keys: PartyKeyPair,
    identity: Party,
    clock: C,
    state: RwLock<NotaryState>,
}

impl NotaryService<SystemClock> {
    pub fn new(keys: PartyKeyPair, config: FinalityConfig) -> Self {
        Self::with_clock(keys, config, SystemClock)
    }
}

impl<C: TimeSource> NotaryService<C> {
    pub fn with_clock(keys: PartyKeyPair, config: FinalityConfig, clock: C) -> Self {
        let identity = keys.party();
        Self {
            config,
            keys,
            identity,
            clock,
            state: RwLock::new(NotaryState::default()),
        }
    }

    /// Number of certificates issued.
    pub fn certified_count(&self) -> usize {
        self.state.read().certified.len()
    }

    /// The transaction that consumed `record_id`, if any.
    pub fn consumed_by(&self, record_id: &RecordId) -> Option<TransactionId> {
        self.state.read().consumed.get(record_id).copied()
    }

    /// Look up an issued certificate.
    pub fn certificate(&self, tx_id: &TransactionId) -> Option<FinalityCertificate> {
        self.state.read().certified.get(tx_id).cloned()
    }

    fn check_transaction(&self, stx: &SignedTransaction) -> FinalityResult<()> {
        let authority = &stx.transition.authority;
        if authority != &self.identity {
            return Err(FinalityError::WrongAuthority {
                expected: self.identity.name.clone(),
                actual: authority.name.clone(),
            });
        }

        let computed = stx.transition.id();
        if computed != stx.id {
            return Err(FinalityError::TransactionIdMismatch {
                expected: computed,
                actual: stx.id,
            });
        }

        if self.config.verify_signatures {
            verify_signed_transaction(stx, &[])?;
        } else if !stx.is_fully_signed() {
            return Err(FinalityError::MissingSignatures {
                missing: stx.missing_signers().iter().map(|p| p.name.clone()).collect(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<C: TimeSource> FinalityAuthority for NotaryService<C> {
    fn identity(&self) -> &Party {
        &self.identity
    }

    async fn certify(&self, stx: &SignedTransaction) -> FinalityResult<FinalityCertificate> {
        self.check_transaction(stx)?;

        let mut state = self.state.write();

        if let Some(existing) = state.certified.get(&stx.id) {
            debug!(tx_id = %stx.id.short(), "Transaction already certified");
            return Ok(existing.clone());
        }

        for record in &stx.transition.consumed {
            if state.produced.get(&record.id()) != Some(record) {
                warn!(
                    tx_id = %stx.id.short(),
                    record_id = %record.id(),
                    "Refusing unrecognised input"
                );
                return Err(FinalityError::UnrecognisedInput {
                    record_id: record.id(),
                });
            }
            if let Some(consumed_by) = state.consumed.get(&record.id()) {
                warn!(
                    tx_id = %stx.id.short(),
                    record_id = %record.id(),
                    consumed_by = %consumed_by.short(),
                    "Refusing double consumption"
                );
                return Err(FinalityError::ConflictingConsumption {
                    record_id: record.id(),
                    consumed_by: *consumed_by,
                });
            }
        }

        let sequence = state.last_sequence + 1;
        let certified_at_ms = self.clock.now_millis();
        let signature = self.keys.sign(&FinalityCertificate::signable_bytes(
            &stx.id,
            sequence,
            certified_at_ms,
        ));
        let certificate = FinalityCertificate {
            tx_id: stx.id,
            authority: self.identity.clone(),
            sequence,
            certified_at_ms,
            signature,
        };

        for record in &stx.transition.consumed {
            state.consumed.insert(record.id(), stx.id);
        }
        for record in &stx.transition.produced {
            state.produced.insert(record.id(), record.clone());
        }
        state.last_sequence = sequence;
        state.certified.insert(stx.id, certificate.clone());
        drop(state);

        FINALITY_CERTIFICATES.inc();
        info!(
            tx_id = %stx.id.short(),
            command = %stx.transition.command,
            sequence,
            "Transaction certified"
        );
        Ok(certificate)
    }
}
