//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key bytes are not a valid curve point
    #[error("Invalid public key: {key}")]
    InvalidPublicKey {
        /// Hex encoded key
        key: String,
    },

    /// Signature verification failed
    #[error("Signature verification failed for key {signer}")]
    SignatureVerificationFailed {
        /// Hex encoded signer key
        signer: String,
    },

    /// Transaction id does not match the transition content
    #[error("Transaction id does not match its content")]
    DigestMismatch,

    /// Required signers have not signed
    #[error("Missing signatures from: {}", missing.join(", "))]
    MissingSignatures {
        /// Names of the parties that still have to sign
        missing: Vec<String>,
    },

    /// A signature from a key that is not a required signer
    #[error("Unexpected signer {signer}")]
    UnexpectedSigner {
        /// Hex encoded signer key
        signer: String,
    },

    /// Certificate was not issued by the expected authority
    #[error("Certificate issued by {actual}, expected {expected}")]
    WrongAuthority {
        /// Expected authority name
        expected: String,
        /// Authority named on the certificate
        actual: String,
    },
}
