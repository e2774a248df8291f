//! # Exchange Scenarios
//!
//! A message sent, refused locally, refused by the counterparty, and
//! answered.

use super::fixtures::{guarded, Exchange};
use mx_01_contract::{require, ContractRules};
use mx_02_finality::FinalityAuthority;
use mx_03_flows::{
    FlowError, NoopHooks, Responder, ResponderRegistry, Role, TerminalState, SEND_MESSAGE_PROTOCOL,
};
use mx_04_extensions::RequiredPhrase;
use shared_bus::InMemorySessionRouter;
use shared_types::RecordId;
use std::sync::Arc;

// =============================================================================
// SEND
// =============================================================================

#[tokio::test]
async fn test_both_parties_hold_identical_finalized_record() {
    let exchange = Exchange::new();
    let served = exchange.serve(&exchange.bob, exchange.plain_responder(&exchange.bob), 1);

    let record = exchange.message("hi");
    let initiator_view = guarded(exchange.plain_initiator(&exchange.alice).run(record.clone()))
        .await
        .unwrap();
    let responder_view = guarded(served).await.unwrap().pop().unwrap().unwrap();

    assert_eq!(initiator_view, responder_view);
    assert_eq!(initiator_view.record(), Some(&record));
    assert!(initiator_view.transaction.is_fully_signed());
    assert_eq!(&initiator_view.certificate.authority, exchange.notary.identity());
    assert_eq!(exchange.notary.certified_count(), 1);
}

#[tokio::test]
async fn test_missing_passphrase_fails_before_any_session() {
    let exchange = Exchange::new();
    let rules = ContractRules::new().with_predicate(Arc::new(RequiredPhrase::default()));
    let _served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, rules.clone(), Arc::new(NoopHooks)),
        1,
    );

    let result = guarded(
        exchange
            .initiator(&exchange.alice, rules, Arc::new(NoopHooks))
            .run(exchange.message("hi")),
    )
    .await;

    let error = result.unwrap_err();
    assert_eq!(
        error,
        FlowError::ExtraValidationRejected {
            reason: "Message must contain the secret passphrase".to_string()
        }
    );
    assert_eq!(error.terminal_state(Role::Initiator), TerminalState::ValidationFailed);
    assert_eq!(exchange.router.sessions_opened(), 0);
    assert_eq!(exchange.notary.certified_count(), 0);
}

#[tokio::test]
async fn test_passphrase_present_on_both_sides_completes() {
    let exchange = Exchange::new();
    let rules = ContractRules::new().with_predicate(Arc::new(RequiredPhrase::default()));
    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, rules.clone(), Arc::new(NoopHooks)),
        1,
    );

    let finalized = guarded(
        exchange
            .initiator(&exchange.alice, rules, Arc::new(NoopHooks))
            .run(exchange.message("hi I love Corda")),
    )
    .await
    .unwrap();

    let responder_view = guarded(served).await.unwrap().pop().unwrap().unwrap();
    assert_eq!(finalized, responder_view);
}

#[tokio::test]
async fn test_counterparty_rejection_reason_is_verbatim() {
    const REASON: &str = "PartyB only accepts messages longer than five characters";

    let exchange = Exchange::new();
    let strict = ContractRules::new().with_check("min-length", |transition| {
        let long_enough = transition
            .single_output()
            .is_some_and(|record| record.contents().len() > 5);
        require(long_enough, REASON)
    });
    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, strict, Arc::new(NoopHooks)),
        1,
    );

    let result = guarded(exchange.plain_initiator(&exchange.alice).run(exchange.message("hi"))).await;

    let error = result.unwrap_err();
    assert_eq!(
        error,
        FlowError::CounterpartyRejected {
            reason: REASON.to_string()
        }
    );
    assert_eq!(error.terminal_state(Role::Initiator), TerminalState::SignatureCollectionFailed);

    let responder_result = guarded(served).await.unwrap().pop().unwrap();
    assert!(matches!(
        responder_result,
        Err(FlowError::ExtraValidationRejected { .. })
    ));
    assert_eq!(exchange.notary.certified_count(), 0);
}

#[tokio::test]
async fn test_initiator_must_be_sender() {
    let exchange = Exchange::new();
    // Bob's flow asked to send a record whose sender is Alice.
    let result = guarded(exchange.plain_initiator(&exchange.bob).run(exchange.message("hi"))).await;

    assert_eq!(
        result.unwrap_err(),
        FlowError::InvalidTransition {
            reason: "Initiator must be the sender of the message.".to_string()
        }
    );
    assert_eq!(exchange.router.sessions_opened(), 0);
}

#[tokio::test]
async fn test_unregistered_recipient_is_channel_closed() {
    let exchange = Exchange::new();
    let result = guarded(exchange.plain_initiator(&exchange.alice).run(exchange.message("hi"))).await;

    let error = result.unwrap_err();
    assert!(matches!(error, FlowError::ChannelClosed { .. }));
    assert_eq!(error.terminal_state(Role::Initiator), TerminalState::SignatureCollectionFailed);
}

// =============================================================================
// REPLY
// =============================================================================

#[tokio::test]
async fn test_reply_consumes_prior_record() {
    let exchange = Exchange::new();
    let bob_served = exchange.serve(&exchange.bob, exchange.plain_responder(&exchange.bob), 1);
    let alice_served = exchange.serve(&exchange.alice, exchange.plain_responder(&exchange.alice), 1);

    let sent = guarded(exchange.plain_initiator(&exchange.alice).run(exchange.message("hi")))
        .await
        .unwrap();
    guarded(bob_served).await.unwrap();

    let prior = sent.record().unwrap().clone();
    let answer = prior.reply("hello back", RecordId::new());
    let replied = guarded(
        exchange
            .plain_initiator(&exchange.bob)
            .run_reply(prior.clone(), answer.clone()),
    )
    .await
    .unwrap();
    let alice_view = guarded(alice_served).await.unwrap().pop().unwrap().unwrap();

    assert_eq!(replied, alice_view);
    let reply = replied.record().unwrap();
    assert_eq!(reply.sender(), &exchange.bob.party());
    assert_eq!(reply.recipient(), &exchange.alice.party());
    assert_eq!(reply.in_reply_to(), Some(prior.id()));
    assert_ne!(reply.id(), prior.id());
    assert_eq!(replied.transaction.transition.single_input(), Some(&prior));
    assert_eq!(exchange.notary.consumed_by(&prior.id()), Some(replied.id()));
}

#[tokio::test]
async fn test_second_reply_to_same_record_is_refused() {
    let exchange = Exchange::new();
    let bob_served = exchange.serve(&exchange.bob, exchange.plain_responder(&exchange.bob), 1);
    let alice_served = exchange.serve(&exchange.alice, exchange.plain_responder(&exchange.alice), 2);

    let sent = guarded(exchange.plain_initiator(&exchange.alice).run(exchange.message("hi")))
        .await
        .unwrap();
    guarded(bob_served).await.unwrap();

    let prior = sent.record().unwrap().clone();
    let bob_flow = exchange.plain_initiator(&exchange.bob);
    let first = prior.reply("first answer", RecordId::new());
    guarded(bob_flow.run_reply(prior.clone(), first))
        .await
        .unwrap();

    let second = prior.reply("second answer", RecordId::new());
    let result = guarded(bob_flow.run_reply(prior.clone(), second)).await;

    let error = result.unwrap_err();
    assert!(
        matches!(&error, FlowError::FinalityFailed { reason } if reason.contains("already consumed")),
        "unexpected error: {error:?}"
    );
    assert_eq!(error.terminal_state(Role::Initiator), TerminalState::FinalityFailed);

    let alice_results = guarded(alice_served).await.unwrap();
    assert!(alice_results[0].is_ok());
    assert!(alice_results[1].is_err());
    assert_eq!(exchange.notary.certified_count(), 2);
}

#[tokio::test]
async fn test_independent_routers_do_not_see_each_other() {
    let exchange = Exchange::new();
    let other_router = InMemorySessionRouter::new();
    let _inbox = other_router.register(exchange.bob.party());

    assert!(!exchange.router.is_registered(&exchange.bob.party()));
    let result = guarded(exchange.plain_initiator(&exchange.alice).run(exchange.message("hi"))).await;
    assert!(matches!(result, Err(FlowError::ChannelClosed { .. })));
}

#[tokio::test]
async fn test_one_registered_responder_serves_concurrent_sessions() {
    let exchange = Exchange::new();
    let registry = ResponderRegistry::new();
    registry.register(SEND_MESSAGE_PROTOCOL, exchange.plain_responder(&exchange.bob));
    let mut inbox = exchange.router.register(exchange.bob.party());

    let accepting = tokio::spawn(async move {
        let mut sessions = Vec::new();
        for _ in 0..2 {
            let inbound = inbox.accept().await.unwrap();
            let responder = registry.resolve(&inbound.protocol).unwrap();
            sessions.push(tokio::spawn(async move {
                responder.respond(inbound.channel).await
            }));
        }
        sessions
    });

    let initiator = exchange.plain_initiator(&exchange.alice);
    let (first, second) = guarded(async {
        tokio::join!(
            initiator.run(exchange.message("first")),
            initiator.run(exchange.message("second"))
        )
    })
    .await;
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.id(), second.id());

    let mut answered = Vec::new();
    for session in guarded(accepting).await.unwrap() {
        answered.push(guarded(session).await.unwrap().unwrap().id());
    }
    answered.sort();
    let mut expected = vec![first.id(), second.id()];
    expected.sort();
    assert_eq!(answered, expected);
    assert_eq!(exchange.notary.certified_count(), 2);
}
