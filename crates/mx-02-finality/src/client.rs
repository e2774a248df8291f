//! Finality client used by protocol sessions

use crate::error::{FinalityError, FinalityResult};
use crate::ports::inbound::FinalityAuthority;
use shared_bus::{SessionChannel, SessionMessage};
use shared_crypto::{verify_certificate, verify_signed_transaction};
use shared_types::{FinalizedRecord, Party, SignedTransaction, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Submits transactions for finality and awaits finalized results.
///
/// Stateless apart from the shared authority handle; clones share it.
#[derive(Clone)]
pub struct FinalityClient {
    authority: Arc<dyn FinalityAuthority>,
    finality_timeout: Duration,
}

impl FinalityClient {
    pub fn new(authority: Arc<dyn FinalityAuthority>, finality_timeout: Duration) -> Self {
        Self {
            authority,
            finality_timeout,
        }
    }

    /// The authority this client certifies with.
    pub fn authority(&self) -> &Party {
        self.authority.identity()
    }

    pub fn finality_timeout(&self) -> Duration {
        self.finality_timeout
    }

    /// Certify `stx` and deliver the finalized record on every session.
    ///
    /// Once certified the transaction is final; a session that can no longer
    /// be reached is logged and skipped.
    pub async fn submit(
        &self,
        stx: &SignedTransaction,
        sessions: &mut [SessionChannel],
    ) -> FinalityResult<FinalizedRecord> {
        let certificate = self.authority.certify(stx).await?;
        let finalized = FinalizedRecord {
            transaction: stx.clone(),
            certificate,
        };
        self.check_finalized(&finalized, &stx.id)?;

        for session in sessions.iter_mut() {
            if let Err(e) = session
                .send(SessionMessage::Finalized(finalized.clone()))
                .await
            {
                warn!(
                    session_id = %session.session_id(),
                    counterparty = %session.counterparty(),
                    tx_id = %stx.id.short(),
                    error = %e,
                    "Could not deliver finalized record"
                );
            }
        }

        debug!(
            tx_id = %stx.id.short(),
            sequence = finalized.certificate.sequence,
            sessions = sessions.len(),
            "Finality submitted"
        );
        Ok(finalized)
    }

    /// Wait for the finalized record of `expected` on `session`.
    ///
    /// Bounded by the finality timeout. The delivered record must name the
    /// expected transaction, match its own content, be fully signed and carry
    /// a certificate from this client's authority.
    pub async fn await_finality(
        &self,
        session: &mut SessionChannel,
        expected: &TransactionId,
    ) -> FinalityResult<FinalizedRecord> {
        let message = session.receive_within(self.finality_timeout).await?;
        let finalized = match message {
            SessionMessage::Finalized(finalized) => finalized,
            other => return Err(FinalityError::UnexpectedMessage { kind: other.kind() }),
        };

        self.check_finalized(&finalized, expected)?;
        debug!(
            tx_id = %expected.short(),
            sequence = finalized.certificate.sequence,
            "Finality observed"
        );
        Ok(finalized)
    }

    fn check_finalized(
        &self,
        finalized: &FinalizedRecord,
        expected: &TransactionId,
    ) -> FinalityResult<()> {
        let transaction = &finalized.transaction;
        if &transaction.id != expected {
            return Err(FinalityError::TransactionIdMismatch {
                expected: *expected,
                actual: transaction.id,
            });
        }
        let computed = transaction.transition.id();
        if computed != transaction.id {
            return Err(FinalityError::TransactionIdMismatch {
                expected: *expected,
                actual: computed,
            });
        }
        if finalized.certificate.tx_id != transaction.id {
            return Err(FinalityError::InvalidCertificate {
                reason: format!(
                    "certificate is for {}, not {}",
                    finalized.certificate.tx_id.short(),
                    transaction.id.short()
                ),
            });
        }

        verify_signed_transaction(transaction, &[])?;
        verify_certificate(&finalized.certificate, self.authority()).map_err(|e| {
            FinalityError::InvalidCertificate {
                reason: e.to_string(),
            }
        })
    }
}

impl std::fmt::Debug for FinalityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinalityClient")
            .field("authority", &self.authority().name)
            .field("finality_timeout", &self.finality_timeout)
            .finish()
    }
}
