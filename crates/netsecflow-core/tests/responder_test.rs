#![allow(clippy::unwrap_used)]
// End-to-end escalation: event -> ledger -> tier -> controller calls.

mod common;

use std::sync::Arc;

use common::{ATTACKER, Call, HONEYPOT, Recorder, SWITCH_1, SWITCH_2, SWITCH_3};
use netsecflow_api::types::{AclAction, ConnectPoint, Intent};
use netsecflow_core::settings::{HONEYPOT_KEY, MODE_KEY};
use netsecflow_core::{
    ActionSynthesizer, ActionTier, CoreError, EscalationPolicy, Event, EventOutcome,
    MemorySettings, Origin, ResponseProfile, Responder, RiskLedger, SettingsStore,
};
use pretty_assertions::assert_eq;

type TestResponder = Responder<MemorySettings, Recorder, Recorder>;

fn responder_with(
    settings: MemorySettings,
    recorder: Recorder,
) -> (Arc<Recorder>, Arc<MemorySettings>, TestResponder) {
    let recorder = Arc::new(recorder);
    let settings = Arc::new(settings);
    let synth = ActionSynthesizer::new(
        Arc::clone(&recorder),
        Arc::clone(&recorder),
        ResponseProfile::default(),
    );
    let responder = Responder::new(
        Arc::new(RiskLedger::new(Arc::clone(&settings))),
        EscalationPolicy::default(),
        Arc::new(synth),
    );
    (recorder, settings, responder)
}

fn configured(mode: &str) -> MemorySettings {
    MemorySettings::with_entries([(MODE_KEY, mode), (HONEYPOT_KEY, HONEYPOT)])
}

fn event(source: &str, score: f64) -> Event {
    Event::new(source, score, ATTACKER, HONEYPOT)
}

fn tier_of(outcome: &EventOutcome) -> ActionTier {
    outcome.decision().unwrap().tier
}

// ── Rejections ──────────────────────────────────────────────────────

#[tokio::test]
async fn missing_mode_rejects_without_touching_ledger() {
    let settings = MemorySettings::with_entries([(HONEYPOT_KEY, HONEYPOT)]);
    let (recorder, settings, responder) = responder_with(settings, Recorder::new());

    let outcome = responder.handle(&event("IDS", 90.0)).await.unwrap();

    assert!(matches!(
        outcome,
        EventOutcome::Rejected { error: CoreError::MissingSetting { ref key } } if key == MODE_KEY
    ));
    assert!(outcome.actions().is_empty());
    assert!(settings.get("10.0.0.1 marks").await.unwrap().is_none());
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn missing_honeypot_rejects() {
    let settings = MemorySettings::with_entries([(MODE_KEY, "strict")]);
    let (_, _, responder) = responder_with(settings, Recorder::new());

    let outcome = responder.handle(&event("IDS", 90.0)).await.unwrap();
    assert!(outcome.is_rejected());
}

#[tokio::test]
async fn unknown_source_or_mode_takes_no_action() {
    let (recorder, settings, responder) = responder_with(configured("balanced"), Recorder::new());

    let outcome = responder.handle(&event("Syslog", 90.0)).await.unwrap();
    assert!(outcome.is_rejected());
    assert!(outcome.actions().is_empty());

    settings.set(MODE_KEY, "paranoid").await.unwrap();
    let outcome = responder.handle(&event("IDS", 90.0)).await.unwrap();
    assert!(matches!(
        outcome,
        EventOutcome::Rejected { error: CoreError::UnknownMode { .. } }
    ));

    assert!(settings.get("10.0.0.1 marks").await.unwrap().is_none());
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn negative_score_is_rejected() {
    let (_, _, responder) = responder_with(configured("strict"), Recorder::new());
    let outcome = responder.handle(&event("EDR", -5.0)).await.unwrap();
    assert!(outcome.is_rejected());
}

// ── Tiers ───────────────────────────────────────────────────────────

#[tokio::test]
async fn honeypot_event_on_prior_risk_redirects() {
    let settings = configured("balanced");
    settings.set("10.0.0.1 marks", "45.0").await.unwrap();
    let (recorder, _, responder) = responder_with(settings, Recorder::new());

    let outcome = responder.handle(&event("Honeypot", 50.0)).await.unwrap();

    assert!(matches!(outcome, EventOutcome::Executed { .. }));
    assert_eq!(outcome.actions(), vec![ActionTier::Redirect]);
    assert!((outcome.decision().unwrap().risk - 65.0).abs() < 1e-9);
    assert!((responder.ledger().get(ATTACKER).await.unwrap() - 65.0).abs() < 1e-9);

    let audits = recorder.audits();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].origin, Origin::Automated);

    match &recorder.intents()[..] {
        [Intent::PointToPoint(p2p)] => {
            assert_eq!(p2p.ingress_point, ConnectPoint::new(SWITCH_1, "1"));
            assert_eq!(p2p.egress_point, ConnectPoint::new(SWITCH_2, "1"));
        }
        other => panic!("unexpected intents: {other:?}"),
    }
}

#[tokio::test]
async fn low_score_takes_no_action() {
    let (recorder, _, responder) = responder_with(configured("loose"), Recorder::new());

    let outcome = responder.handle(&event("Netflow", 10.0)).await.unwrap();

    assert_eq!(outcome.actions(), vec![ActionTier::NoAction]);
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn intermediate_tier_redirects_to_configured_device() {
    let (recorder, _, responder) = responder_with(configured("balanced"), Recorder::new());

    // 60 * 0.8 * 0.5 = 24
    let outcome = responder.handle(&event("Honeypot", 60.0)).await.unwrap();

    assert_eq!(tier_of(&outcome), ActionTier::IntermediateRedirect);
    match &recorder.intents()[..] {
        [Intent::PointToPoint(p2p)] => {
            assert_eq!(p2p.egress_point, ConnectPoint::new(SWITCH_1, "3"));
        }
        other => panic!("unexpected intents: {other:?}"),
    }
    assert!(recorder.audits()[0].reason.contains(SWITCH_3));
}

#[tokio::test]
async fn rate_limit_tier_uses_profile_rate() {
    let (recorder, _, responder) = responder_with(configured("strict"), Recorder::new());

    // 100 * 0.6 * 0.8 = 48
    let outcome = responder.handle(&event("IDS", 100.0)).await.unwrap();

    assert_eq!(tier_of(&outcome), ActionTier::RateLimit);
    match &recorder.mutations()[..] {
        [Call::CreateMeter(meter), Call::CreateFlow(_)] => assert_eq!(meter.bands[0].rate, 50),
        other => panic!("unexpected mutations: {other:?}"),
    }
}

#[tokio::test]
async fn repeated_events_escalate_to_block() {
    let (recorder, _, responder) = responder_with(configured("strict"), Recorder::new());

    // 80 * 0.8 * 0.8 = 51.2 per event
    let first = responder.handle(&event("Honeypot", 80.0)).await.unwrap();
    let second = responder.handle(&event("Honeypot", 80.0)).await.unwrap();

    assert_eq!(tier_of(&first), ActionTier::RateLimit);
    assert_eq!(tier_of(&second), ActionTier::Block);

    let last = recorder.mutations().pop().unwrap();
    match last {
        Call::CreateAcl(rule) => {
            assert_eq!(rule.action, AclAction::Deny);
            assert_eq!(rule.src_ip.as_deref(), Some("10.0.0.1/32"));
        }
        other => panic!("expected ACL rule, got {other:?}"),
    }
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_meter_is_execution_failure_but_risk_sticks() {
    let recorder = Recorder::failing_meter();
    let (recorder, _, responder) = responder_with(configured("strict"), recorder);

    let outcome = responder.handle(&event("IDS", 100.0)).await.unwrap();

    assert!(matches!(outcome, EventOutcome::ExecutionFailed { .. }));
    assert_eq!(outcome.actions(), vec![ActionTier::RateLimit]);
    assert!(!recorder.calls().iter().any(|c| matches!(c, Call::CreateFlow(_))));
    assert!((responder.ledger().get(ATTACKER).await.unwrap() - 48.0).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_attacker_host_is_execution_failure() {
    let (recorder, _, responder) = responder_with(configured("strict"), Recorder::new());

    let outcome = responder
        .handle(&Event::new("IDS", 100.0, "10.9.9.9", HONEYPOT))
        .await
        .unwrap();

    match outcome {
        EventOutcome::ExecutionFailed { error, .. } => {
            assert!(matches!(error, CoreError::HostNotFound { .. }));
        }
        other => panic!("expected execution failure, got {other:?}"),
    }
    assert!(recorder.mutations().is_empty());
}
