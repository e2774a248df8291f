//! # Hook Scenarios
//!
//! Firing order across both sides, isolation of failing hooks, and the
//! persistence and notification variants end to end.

use super::fixtures::{guarded, Exchange, RecordingHooks};
use async_trait::async_trait;
use mx_01_contract::ContractRules;
use mx_03_flows::{
    HookChain, HookError, HookResult, InitiatorHooks, NoopHooks, ResponderHooks,
};
use mx_04_extensions::{
    AcknowledgerConfig, InMemoryMessageRepository, MessageAcknowledger, MessageRepository,
    NotificationHooks, PersistenceHooks,
};
use mx_telemetry::HOOK_FAILURES;
use parking_lot::Mutex;
use shared_types::FinalizedRecord;
use std::sync::Arc;
use std::time::Duration;

/// Fails every `after_committed` call on either side.
struct MockFailingCommitHooks;

#[async_trait]
impl InitiatorHooks for MockFailingCommitHooks {
    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        Err(HookError::Store {
            reason: "disk full".to_string(),
        })
    }
}

#[async_trait]
impl ResponderHooks for MockFailingCommitHooks {
    async fn after_committed(&self, _finalized: &FinalizedRecord) -> HookResult {
        Err(HookError::Store {
            reason: "disk full".to_string(),
        })
    }
}

fn position(trace: &[String], entry: &str) -> usize {
    trace
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {trace:?}"))
}

// =============================================================================
// ORDERING
// =============================================================================

#[tokio::test]
async fn test_hooks_fire_in_protocol_order() {
    let exchange = Exchange::new();
    let trace = Arc::new(Mutex::new(Vec::new()));
    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(
            &exchange.bob,
            ContractRules::new(),
            Arc::new(RecordingHooks::new("responder", trace.clone())),
        ),
        1,
    );

    guarded(
        exchange
            .initiator(
                &exchange.alice,
                ContractRules::new(),
                Arc::new(RecordingHooks::new("initiator", trace.clone())),
            )
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();
    guarded(served).await.unwrap().pop().unwrap().unwrap();

    let trace = trace.lock().clone();
    let initiator: Vec<&str> = trace
        .iter()
        .filter_map(|e| e.strip_prefix("initiator:"))
        .collect();
    let responder: Vec<&str> = trace
        .iter()
        .filter_map(|e| e.strip_prefix("responder:"))
        .collect();

    assert_eq!(
        initiator,
        vec![
            "before_build",
            "before_signature_request",
            "after_signature_collected",
            "after_committed"
        ]
    );
    assert_eq!(
        responder,
        vec!["before_counter_sign", "after_counter_signed", "after_committed"]
    );

    // The proposal is sent after before_signature_request, and the
    // counter-signature is sent after before_counter_sign.
    assert!(
        position(&trace, "initiator:before_signature_request")
            < position(&trace, "responder:before_counter_sign")
    );
    assert!(
        position(&trace, "responder:before_counter_sign")
            < position(&trace, "initiator:after_signature_collected")
    );
}

#[tokio::test]
async fn test_no_commit_hooks_when_counterparty_rejects() {
    let exchange = Exchange::new();
    let trace = Arc::new(Mutex::new(Vec::new()));
    let refuse_all = ContractRules::new().with_check("refuse-all", |_| Err("no".to_string()));
    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(
            &exchange.bob,
            refuse_all,
            Arc::new(RecordingHooks::new("responder", trace.clone())),
        ),
        1,
    );

    let result = guarded(
        exchange
            .initiator(
                &exchange.alice,
                ContractRules::new(),
                Arc::new(RecordingHooks::new("initiator", trace.clone())),
            )
            .run(exchange.message("hi")),
    )
    .await;
    assert!(result.is_err());
    guarded(served).await.unwrap();

    let trace = trace.lock().clone();
    assert!(trace.contains(&"responder:before_counter_sign".to_string()));
    assert!(!trace.iter().any(|e| e.ends_with("after_signature_collected")));
    assert!(!trace.iter().any(|e| e.ends_with("after_counter_signed")));
    assert!(!trace.iter().any(|e| e.ends_with("after_committed")));
}

// =============================================================================
// ISOLATION
// =============================================================================

#[tokio::test]
async fn test_failing_commit_hook_does_not_fail_session() {
    let exchange = Exchange::new();
    let failures_before = HOOK_FAILURES.with_label_values(&["after_committed"]).get();

    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(
            &exchange.bob,
            ContractRules::new(),
            Arc::new(MockFailingCommitHooks),
        ),
        1,
    );
    let finalized = guarded(
        exchange
            .initiator(
                &exchange.alice,
                ContractRules::new(),
                Arc::new(MockFailingCommitHooks),
            )
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();
    let responder_view = guarded(served).await.unwrap().pop().unwrap().unwrap();

    assert_eq!(finalized, responder_view);
    let failures_after = HOOK_FAILURES.with_label_values(&["after_committed"]).get();
    assert!(failures_after >= failures_before + 2);
}

#[tokio::test]
async fn test_failing_member_does_not_stop_chain() {
    let exchange = Exchange::new();
    let trace = Arc::new(Mutex::new(Vec::new()));
    let chain: HookChain<dyn InitiatorHooks> = HookChain::<dyn InitiatorHooks>::new()
        .with(Arc::new(MockFailingCommitHooks) as Arc<dyn InitiatorHooks>)
        .with(Arc::new(RecordingHooks::new("initiator", trace.clone())) as Arc<dyn InitiatorHooks>);

    let served = exchange.serve(&exchange.bob, exchange.plain_responder(&exchange.bob), 1);
    guarded(
        exchange
            .initiator(&exchange.alice, ContractRules::new(), Arc::new(chain))
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();
    guarded(served).await.unwrap();

    assert!(trace
        .lock()
        .contains(&"initiator:after_committed".to_string()));
}

// =============================================================================
// EXTENSION VARIANTS
// =============================================================================

#[tokio::test]
async fn test_persistence_records_each_side() {
    let exchange = Exchange::new();
    let repository = Arc::new(InMemoryMessageRepository::new());
    let hooks = Arc::new(PersistenceHooks::new(repository.clone()));

    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, ContractRules::new(), hooks.clone()),
        1,
    );
    let finalized = guarded(
        exchange
            .initiator(&exchange.alice, ContractRules::new(), hooks)
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();
    guarded(served).await.unwrap().pop().unwrap().unwrap();

    let record = finalized.record().unwrap();
    let sent = repository.find_all_by_party("PartyA").await.unwrap();
    let received = repository.find_all_by_party("PartyB").await.unwrap();

    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, *record.id().as_uuid());
    assert_eq!(sent[0].content, "hi");
    assert!(sent[0].committed);

    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, *record.id().as_uuid());
    assert!(received[0].committed);
    assert_eq!(repository.len(), 2);
}

#[tokio::test]
async fn test_unreachable_acknowledgement_endpoint_is_tolerated() {
    let exchange = Exchange::new();
    let mut config = AcknowledgerConfig::new("http://127.0.0.1:9/messages");
    config.request_timeout = Duration::from_millis(200);
    let hooks = Arc::new(NotificationHooks::new(Arc::new(
        MessageAcknowledger::new(config).unwrap(),
    )));

    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, ContractRules::new(), hooks.clone()),
        1,
    );
    let finalized = guarded(
        exchange
            .initiator(&exchange.alice, ContractRules::new(), hooks)
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();

    let responder_view = guarded(served).await.unwrap().pop().unwrap().unwrap();
    assert_eq!(finalized, responder_view);
    assert!(HOOK_FAILURES.with_label_values(&["before_build"]).get() >= 1);
}

#[tokio::test]
async fn test_noop_hooks_change_nothing() {
    let exchange = Exchange::new();
    let served = exchange.serve(
        &exchange.bob,
        exchange.responder(&exchange.bob, ContractRules::new(), Arc::new(NoopHooks)),
        1,
    );
    let finalized = guarded(
        exchange
            .initiator(&exchange.alice, ContractRules::new(), Arc::new(NoopHooks))
            .run(exchange.message("hi")),
    )
    .await
    .unwrap();

    assert_eq!(
        guarded(served).await.unwrap().pop().unwrap().unwrap(),
        finalized
    );
}
