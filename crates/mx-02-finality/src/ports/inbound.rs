//! Driving Ports (API - Inbound)

use crate::error::FinalityResult;
use async_trait::async_trait;
use shared_types::{FinalityCertificate, Party, SignedTransaction};

/// Primary Finality API
///
/// Implementations are shared by every session of a node and must be safe to
/// call concurrently.
#[async_trait]
pub trait FinalityAuthority: Send + Sync {
    /// The identity certificates are signed with.
    fn identity(&self) -> &Party;

    /// Certify a fully signed transaction as final.
    ///
    /// Certifying an already certified transaction returns the original
    /// certificate.
    async fn certify(&self, transaction: &SignedTransaction) -> FinalityResult<FinalityCertificate>;
}
