//! # Finality Scenarios
//!
//! One side of each session is driven by hand so the test can misbehave:
//! finalize a different transaction, forge a certificate, go silent, or
//! counter-sign with the wrong key.

use super::fixtures::{guarded, Exchange};
use mx_02_finality::FinalityAuthority;
use mx_03_flows::{FlowError, FlowResult, Role, TerminalState, SEND_MESSAGE_PROTOCOL};
use shared_bus::{SessionChannel, SessionMessage, SessionRouter};
use shared_crypto::PartyKeyPair;
use shared_types::{
    FinalityCertificate, FinalizedRecord, SignedTransaction, TransactionSignature, Transition,
};
use tokio::task::JoinHandle;

/// Alice's end of a session whose other end is served by Bob's responder.
async fn session_with_responder(
    exchange: &Exchange,
) -> (SessionChannel, JoinHandle<FlowResult<FinalizedRecord>>) {
    let mut inbox = exchange.router.register(exchange.bob.party());
    let alice_end = exchange
        .router
        .open_session(&exchange.alice.party(), &exchange.bob.party(), SEND_MESSAGE_PROTOCOL)
        .await
        .unwrap();
    let bob_end = inbox.accept().await.unwrap().channel;
    let responder = exchange.plain_responder(&exchange.bob);
    let handle = tokio::spawn(async move { responder.run(bob_end).await });
    (alice_end, handle)
}

/// Alice-signed transaction sending `contents` to Bob.
fn proposal(exchange: &Exchange, contents: &str) -> SignedTransaction {
    let transition = Transition::send(
        exchange.message(contents),
        exchange.notary.identity().clone(),
    );
    let stx = SignedTransaction::new(transition);
    let signature = exchange.alice.sign_transaction(&stx.id);
    stx.with_signature(signature).unwrap()
}

/// Propose `stx` and return it with Bob's counter-signature attached.
async fn counter_signed(alice_end: &mut SessionChannel, stx: SignedTransaction) -> SignedTransaction {
    alice_end
        .send(SessionMessage::Propose(stx.clone()))
        .await
        .unwrap();
    match guarded(alice_end.receive()).await.unwrap() {
        SessionMessage::CounterSignature(signature) => stx.with_signature(signature).unwrap(),
        other => panic!("expected a counter-signature, got {}", other.kind()),
    }
}

// =============================================================================
// RESPONDER SIDE
// =============================================================================

#[tokio::test]
async fn test_substituted_finalization_detected() {
    let exchange = Exchange::new();
    let (mut alice_end, responder) = session_with_responder(&exchange).await;
    let signed = counter_signed(&mut alice_end, proposal(&exchange, "hi")).await;

    // A different, properly certified transaction.
    let other = proposal(&exchange, "not what you signed");
    let other = other
        .clone()
        .with_signature(exchange.bob.sign_transaction(&other.id))
        .unwrap();
    let certificate = exchange.notary.certify(&other).await.unwrap();
    alice_end
        .send(SessionMessage::Finalized(FinalizedRecord {
            transaction: other.clone(),
            certificate,
        }))
        .await
        .unwrap();

    let error = guarded(responder).await.unwrap().unwrap_err();
    assert_eq!(
        error,
        FlowError::FinalizedTransactionMismatch {
            expected: signed.id,
            actual: other.id
        }
    );
    assert_eq!(error.terminal_state(Role::Responder), TerminalState::FinalityFailed);
}

#[tokio::test]
async fn test_certificate_from_other_authority_refused() {
    let exchange = Exchange::new();
    let (mut alice_end, responder) = session_with_responder(&exchange).await;
    let signed = counter_signed(&mut alice_end, proposal(&exchange, "hi")).await;

    let rogue = PartyKeyPair::generate("RogueNotary");
    let forged = FinalityCertificate {
        tx_id: signed.id,
        authority: rogue.party(),
        sequence: 1,
        certified_at_ms: 0,
        signature: rogue.sign(&FinalityCertificate::signable_bytes(&signed.id, 1, 0)),
    };
    alice_end
        .send(SessionMessage::Finalized(FinalizedRecord {
            transaction: signed,
            certificate: forged,
        }))
        .await
        .unwrap();

    let error = guarded(responder).await.unwrap().unwrap_err();
    assert!(matches!(error, FlowError::FinalityFailed { .. }), "{error:?}");
}

#[tokio::test]
async fn test_silent_initiator_times_out_finality() {
    let exchange = Exchange::new();
    let (mut alice_end, responder) = session_with_responder(&exchange).await;
    counter_signed(&mut alice_end, proposal(&exchange, "hi")).await;

    // Hold the session open without finalizing.
    let error = guarded(responder).await.unwrap().unwrap_err();
    assert_eq!(error, FlowError::FinalityTimeout { millis: 2000 });
    assert_eq!(error.terminal_state(Role::Responder), TerminalState::FinalityTimeout);
    drop(alice_end);
}

#[tokio::test]
async fn test_unsigned_proposal_rejected() {
    let exchange = Exchange::new();
    let (mut alice_end, responder) = session_with_responder(&exchange).await;

    let unsigned = SignedTransaction::new(Transition::send(
        exchange.message("hi"),
        exchange.notary.identity().clone(),
    ));
    alice_end
        .send(SessionMessage::Propose(unsigned))
        .await
        .unwrap();

    match guarded(alice_end.receive()).await.unwrap() {
        SessionMessage::Rejection { reason } => assert!(reason.contains("PartyA"), "{reason}"),
        other => panic!("expected a rejection, got {}", other.kind()),
    }
    let error = guarded(responder).await.unwrap().unwrap_err();
    assert!(matches!(error, FlowError::InvalidSignature { .. }), "{error:?}");
    assert_eq!(error.terminal_state(Role::Responder), TerminalState::ValidationFailed);
}

// =============================================================================
// INITIATOR SIDE
// =============================================================================

#[tokio::test]
async fn test_counter_signature_from_wrong_key_refused() {
    let exchange = Exchange::new();
    let mut inbox = exchange.router.register(exchange.bob.party());
    let initiator = exchange.plain_initiator(&exchange.alice);
    let record = exchange.message("hi");
    let run = tokio::spawn(async move { initiator.run(record).await });

    let mut bob_end = guarded(inbox.accept()).await.unwrap().channel;
    let stx = match guarded(bob_end.receive()).await.unwrap() {
        SessionMessage::Propose(stx) => stx,
        other => panic!("expected a proposal, got {}", other.kind()),
    };
    let mallory = PartyKeyPair::generate("Mallory");
    let forged: TransactionSignature = mallory.sign_transaction(&stx.id);
    bob_end
        .send(SessionMessage::CounterSignature(forged))
        .await
        .unwrap();

    let error = guarded(run).await.unwrap().unwrap_err();
    assert!(matches!(error, FlowError::InvalidSignature { .. }), "{error:?}");
    assert_eq!(
        error.terminal_state(Role::Initiator),
        TerminalState::SignatureCollectionFailed
    );
    assert_eq!(exchange.notary.certified_count(), 0);
}

#[tokio::test]
async fn test_silent_counterparty_times_out_signature_collection() {
    let exchange = Exchange::new();
    let mut inbox = exchange.router.register(exchange.bob.party());
    let initiator = exchange.plain_initiator(&exchange.alice);
    let record = exchange.message("hi");
    let run = tokio::spawn(async move { initiator.run(record).await });

    // Accept and hold the session, never answering.
    let _bob_end = guarded(inbox.accept()).await.unwrap().channel;

    let error = guarded(run).await.unwrap().unwrap_err();
    assert_eq!(error, FlowError::CounterSignatureTimeout { millis: 1000 });
}

#[tokio::test]
async fn test_unexpected_message_is_protocol_violation() {
    let exchange = Exchange::new();
    let mut inbox = exchange.router.register(exchange.bob.party());
    let initiator = exchange.plain_initiator(&exchange.alice);
    let record = exchange.message("hi");
    let run = tokio::spawn(async move { initiator.run(record).await });

    let mut bob_end = guarded(inbox.accept()).await.unwrap().channel;
    let stx = match guarded(bob_end.receive()).await.unwrap() {
        SessionMessage::Propose(stx) => stx,
        other => panic!("expected a proposal, got {}", other.kind()),
    };
    // Echo the proposal back instead of counter-signing.
    bob_end.send(SessionMessage::Propose(stx)).await.unwrap();

    let error = guarded(run).await.unwrap().unwrap_err();
    assert!(matches!(error, FlowError::ProtocolViolation { .. }), "{error:?}");
}
