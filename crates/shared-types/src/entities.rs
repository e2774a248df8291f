//! # Core Domain Entities
//!
//! Defines the entities exchanged between an initiator and a responder.
//!
//! ## Clusters
//!
//! - **Identities**: `Party`, `PublicKey`, `Signature`
//! - **Records**: `RecordId`, `MessageRecord`
//! - **Transitions**: `Command`, `Transition`, `TransactionId`, `SignedTransaction`
//! - **Finality**: `FinalityCertificate`, `FinalizedRecord`

use crate::errors::EntityError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

// =============================================================================
// CLUSTER A: IDENTITIES
// =============================================================================

/// A globally unique principal taking part in an exchange.
///
/// Two parties are equal only when both the name and the owning key match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    /// Human readable name, unique on the session router.
    pub name: String,
    /// Key that signs on behalf of this party.
    pub owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// CLUSTER B: RECORDS
// =============================================================================

/// Caller-supplied identifier of a record, stable for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The immutable message exchanged between two parties.
///
/// Fields are private so a record cannot change after construction; use
/// [`MessageRecord::reply`] to produce the next record in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    sender: Party,
    recipient: Party,
    contents: String,
    id: RecordId,
    in_reply_to: Option<RecordId>,
}

impl MessageRecord {
    pub fn new(sender: Party, recipient: Party, contents: impl Into<String>, id: RecordId) -> Self {
        Self {
            sender,
            recipient,
            contents: contents.into(),
            id,
            in_reply_to: None,
        }
    }

    /// Build the answer to this record: sender and recipient swap places and
    /// the new record points back at this one.
    #[must_use]
    pub fn reply(&self, contents: impl Into<String>, id: RecordId) -> Self {
        Self {
            sender: self.recipient.clone(),
            recipient: self.sender.clone(),
            contents: contents.into(),
            id,
            in_reply_to: Some(self.id),
        }
    }

    pub fn sender(&self) -> &Party {
        &self.sender
    }

    pub fn recipient(&self) -> &Party {
        &self.recipient
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The record this one answers, if any.
    pub fn in_reply_to(&self) -> Option<RecordId> {
        self.in_reply_to
    }

    /// Always exactly `{sender, recipient}`.
    pub fn participants(&self) -> [&Party; 2] {
        [&self.sender, &self.recipient]
    }

    fn digest_into(&self, hasher: &mut Sha256) {
        digest_party(hasher, &self.sender);
        digest_party(hasher, &self.recipient);
        digest_bytes(hasher, self.contents.as_bytes());
        hasher.update(self.id.0.as_bytes());
        match self.in_reply_to {
            None => hasher.update([0u8]),
            Some(prior) => {
                hasher.update([1u8]);
                hasher.update(prior.0.as_bytes());
            }
        }
    }
}

// =============================================================================
// CLUSTER C: TRANSITIONS
// =============================================================================

/// Command tag attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// A brand new message: nothing consumed, one record produced.
    Send,
    /// An answer: the prior record consumed, one record produced.
    Reply,
}

impl Command {
    fn tag(self) -> u8 {
        match self {
            Command::Send => 0,
            Command::Reply => 1,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Send => f.write_str("Send"),
            Command::Reply => f.write_str("Reply"),
        }
    }
}

/// A proposed state change pending agreement by both parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub command: Command,
    /// Records consumed by this transition, possibly empty.
    pub consumed: Vec<MessageRecord>,
    /// Records produced by this transition.
    pub produced: Vec<MessageRecord>,
    /// Parties whose signatures are required before finality.
    pub required_signers: Vec<Party>,
    /// The finality authority expected to certify this transition.
    pub authority: Party,
}

impl Transition {
    /// Transition that introduces `record` without consuming anything.
    pub fn send(record: MessageRecord, authority: Party) -> Self {
        let required_signers = signers_of(&record);
        Self {
            command: Command::Send,
            consumed: Vec::new(),
            produced: vec![record],
            required_signers,
            authority,
        }
    }

    /// Transition that consumes `prior` and produces `record`.
    pub fn reply(prior: MessageRecord, record: MessageRecord, authority: Party) -> Self {
        let required_signers = signers_of(&record);
        Self {
            command: Command::Reply,
            consumed: vec![prior],
            produced: vec![record],
            required_signers,
            authority,
        }
    }

    /// Content-derived identity of this transition.
    pub fn id(&self) -> TransactionId {
        let mut hasher = Sha256::new();
        hasher.update(b"mx-transition-v1");
        hasher.update([self.command.tag()]);
        hasher.update((self.consumed.len() as u64).to_le_bytes());
        for record in &self.consumed {
            record.digest_into(&mut hasher);
        }
        hasher.update((self.produced.len() as u64).to_le_bytes());
        for record in &self.produced {
            record.digest_into(&mut hasher);
        }
        hasher.update((self.required_signers.len() as u64).to_le_bytes());
        for party in &self.required_signers {
            digest_party(&mut hasher, party);
        }
        digest_party(&mut hasher, &self.authority);
        TransactionId(hasher.finalize().into())
    }

    pub fn required_signing_keys(&self) -> Vec<PublicKey> {
        self.required_signers.iter().map(|p| p.owning_key).collect()
    }

    /// The produced record when there is exactly one.
    pub fn single_output(&self) -> Option<&MessageRecord> {
        match self.produced.as_slice() {
            [record] => Some(record),
            _ => None,
        }
    }

    /// The consumed record when there is exactly one.
    pub fn single_input(&self) -> Option<&MessageRecord> {
        match self.consumed.as_slice() {
            [record] => Some(record),
            _ => None,
        }
    }
}

fn signers_of(record: &MessageRecord) -> Vec<Party> {
    let mut signers: Vec<Party> = Vec::with_capacity(2);
    for party in record.participants() {
        if !signers.contains(party) {
            signers.push(party.clone());
        }
    }
    signers
}

fn digest_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn digest_party(hasher: &mut Sha256, party: &Party) {
    digest_bytes(hasher, party.name.as_bytes());
    hasher.update(party.owning_key);
}

/// Identity of a transition (SHA-256 of its canonical encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(pub Hash);

impl TransactionId {
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A signature over a `TransactionId` (or a certificate payload).
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Public key of the signer.
    pub by: PublicKey,
    /// Ed25519 signature bytes.
    #[serde_as(as = "Bytes")]
    pub bytes: Signature,
}

/// A transition together with the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub id: TransactionId,
    pub transition: Transition,
    pub signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    /// Wrap a transition with no signatures yet.
    pub fn new(transition: Transition) -> Self {
        Self {
            id: transition.id(),
            transition,
            signatures: Vec::new(),
        }
    }

    /// Attach a signature. A key may sign at most once.
    pub fn with_signature(mut self, signature: TransactionSignature) -> Result<Self, EntityError> {
        if self.signatures.iter().any(|s| s.by == signature.by) {
            return Err(EntityError::DuplicateSignature {
                signer: hex::encode(signature.by),
            });
        }
        self.signatures.push(signature);
        Ok(self)
    }

    /// True when the carried id still matches the transition content.
    pub fn id_matches_content(&self) -> bool {
        self.transition.id() == self.id
    }

    pub fn signed_by(&self, key: &PublicKey) -> bool {
        self.signatures.iter().any(|s| &s.by == key)
    }

    /// Required signers that have not signed yet.
    pub fn missing_signers(&self) -> Vec<&Party> {
        self.transition
            .required_signers
            .iter()
            .filter(|p| !self.signed_by(&p.owning_key))
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.missing_signers().is_empty()
    }
}

// =============================================================================
// CLUSTER D: FINALITY
// =============================================================================

/// Proof from the finality authority that a transaction is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityCertificate {
    pub tx_id: TransactionId,
    pub authority: Party,
    /// Position of this transaction in the authority's order.
    pub sequence: u64,
    /// Unix timestamp (milliseconds) of certification.
    pub certified_at_ms: u64,
    /// Authority signature over [`FinalityCertificate::signable_bytes`].
    pub signature: TransactionSignature,
}

impl FinalityCertificate {
    /// Bytes the authority signs for a certificate.
    pub fn signable_bytes(tx_id: &TransactionId, sequence: u64, certified_at_ms: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(14 + 32 + 16);
        bytes.extend_from_slice(b"mx-finality-v1");
        bytes.extend_from_slice(tx_id.as_bytes());
        bytes.extend_from_slice(&sequence.to_le_bytes());
        bytes.extend_from_slice(&certified_at_ms.to_le_bytes());
        bytes
    }

    pub fn payload(&self) -> Vec<u8> {
        Self::signable_bytes(&self.tx_id, self.sequence, self.certified_at_ms)
    }
}

/// A fully signed transaction plus its finality certificate.
///
/// Each participant keeps its own copy; nothing is shared between parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedRecord {
    pub transaction: SignedTransaction,
    pub certificate: FinalityCertificate,
}

impl FinalizedRecord {
    pub fn id(&self) -> TransactionId {
        self.transaction.id
    }

    /// The record this transaction produced.
    pub fn record(&self) -> Option<&MessageRecord> {
        self.transaction.transition.single_output()
    }
}
