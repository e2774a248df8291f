//! # Ed25519 Party Signatures
//!
//! Every party (and the finality authority) holds one Ed25519 key pair. The
//! public half is the `owning_key` of its `Party`.
//!
//! ## Security Properties
//!
//! - No RNG dependency when signing (deterministic nonce from message)
//! - Signatures over a transaction cover its content-derived id only, so the
//!   id is always recomputed before any signature is trusted

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{
    FinalityCertificate, Party, PublicKey, SignedTransaction, TransactionId, TransactionSignature,
};

/// Ed25519 key pair bound to a party name.
pub struct PartyKeyPair {
    name: String,
    signing_key: SigningKey,
}

impl PartyKeyPair {
    /// Generate a random key pair.
    pub fn generate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Create from a secret seed (32 bytes).
    pub fn from_seed(name: impl Into<String>, seed: [u8; 32]) -> Self {
        Self {
            name: name.into(),
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// The party identity this key pair signs for.
    pub fn party(&self) -> Party {
        Party::new(self.name.clone(), self.public_key())
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign arbitrary bytes (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> TransactionSignature {
        TransactionSignature {
            by: self.public_key(),
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// Sign a transaction id.
    pub fn sign_transaction(&self, id: &TransactionId) -> TransactionSignature {
        self.sign(id.as_bytes())
    }
}

impl std::fmt::Debug for PartyKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartyKeyPair")
            .field("name", &self.name)
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// Verify a signature over `message`.
pub fn verify_signature(message: &[u8], signature: &TransactionSignature) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(&signature.by).map_err(|_| CryptoError::InvalidPublicKey {
            key: hex::encode(signature.by),
        })?;

    let sig = ed25519_dalek::Signature::from_bytes(&signature.bytes);

    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed {
            signer: hex::encode(signature.by),
        })
}

/// Verify every signature on `stx`.
///
/// Checks, in order: the id matches the content, every attached signature is
/// from a required signer and verifies, and every required signer not listed
/// in `allowed_missing` has signed.
pub fn verify_signed_transaction(
    stx: &SignedTransaction,
    allowed_missing: &[PublicKey],
) -> Result<(), CryptoError> {
    if !stx.id_matches_content() {
        return Err(CryptoError::DigestMismatch);
    }

    let required = stx.transition.required_signing_keys();
    for signature in &stx.signatures {
        if !required.contains(&signature.by) {
            return Err(CryptoError::UnexpectedSigner {
                signer: hex::encode(signature.by),
            });
        }
        verify_signature(stx.id.as_bytes(), signature)?;
    }

    let missing: Vec<String> = stx
        .missing_signers()
        .into_iter()
        .filter(|p| !allowed_missing.contains(&p.owning_key))
        .map(|p| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(CryptoError::MissingSignatures { missing });
    }

    Ok(())
}

/// Verify a finality certificate was issued by `authority`.
pub fn verify_certificate(
    certificate: &FinalityCertificate,
    authority: &Party,
) -> Result<(), CryptoError> {
    if &certificate.authority != authority || certificate.signature.by != authority.owning_key {
        return Err(CryptoError::WrongAuthority {
            expected: authority.name.clone(),
            actual: certificate.authority.name.clone(),
        });
    }
    verify_signature(&certificate.payload(), &certificate.signature)
}
