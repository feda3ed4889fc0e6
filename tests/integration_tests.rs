use serde_json::{Value, json};

use form_detection::activation::gate::ActivationState;
use form_detection::activation::verification::{Checkpoint, CheckpointResult};
use form_detection::error::DetectError;
use form_detection::messaging::dispatch::handle_command;
use form_detection::messaging::messages::{
    CollectingSink, Command, DeliveryError, MessageSink, OutboundMessage, send,
};
use form_detection::page::page_model::PageClassification;
use form_detection::pipeline::{Pipeline, PipelineConfig, ScorerKind};
use form_detection::policy::site_policy::SitePolicy;
use form_detection::scoring::score_model::ScoringConfig;
use form_detection::settings::store::{InMemorySettings, SettingsStore, keys};
use form_detection::trace::logger::TraceLogger;
use form_detection::trace::trace::{TraceEvent, TraceLevel};

use crate::common::snapshots::{
    application_page, docs_editor_page, empty_page, login_page, twitter_login_page,
};

mod common;

fn pipeline() -> Pipeline {
    Pipeline::assemble(PipelineConfig::default(), SitePolicy::with_defaults())
}

// =========================================================================
// Full verification passes
// =========================================================================

#[test]
fn login_page_settles_minimal() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let tracer = TraceLogger::disabled();

    let state = p.verify_page(&login_page(), &settings, &tracer);
    assert_eq!(state, ActivationState::Minimal);

    let analysis = p.analysis().unwrap();
    assert_eq!(analysis.page_type, PageClassification::HasForms);
    let last = p.gate.stack().last().unwrap();
    assert_eq!(last.checkpoint, Checkpoint::PageAnalysisCheck);
    assert_eq!(last.result, CheckpointResult::HasForms);
}

#[test]
fn dominant_form_page_settles_active() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let state = p.verify_page(&application_page(), &settings, &TraceLogger::disabled());
    assert_eq!(state, ActivationState::Active);
}

#[test]
fn excepted_login_path_on_blocked_domain_settles_active() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let state = p.verify_page(&twitter_login_page(), &settings, &TraceLogger::disabled());

    assert_eq!(state, ActivationState::Active);
    assert_eq!(p.analysis().unwrap().page_type, PageClassification::PrimaryForm);
}

#[test]
fn blocked_domain_settles_blocked() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let state = p.verify_page(&docs_editor_page(), &settings, &TraceLogger::disabled());
    assert_eq!(state, ActivationState::Blocked);
}

#[test]
fn structural_change_upgrades_but_never_downgrades() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let tracer = TraceLogger::disabled();

    assert_eq!(p.verify_page(&empty_page(), &settings, &tracer), ActivationState::Inactive);
    let upgraded = p.structural_change(&login_page(), &settings, &tracer);
    assert_eq!(upgraded, Some(ActivationState::Minimal));

    // Visible state: further structural changes are ignored
    assert_eq!(p.structural_change(&empty_page(), &settings, &tracer), None);
    assert_eq!(p.gate.state(), ActivationState::Minimal);
}

#[test]
fn strict_pipeline_rejects_small_login_forms() {
    let config = PipelineConfig {
        scoring: ScoringConfig { strict: true, ..ScoringConfig::default() },
        ..PipelineConfig::default()
    };
    let mut p = Pipeline::assemble(config, SitePolicy::with_defaults());
    let settings = InMemorySettings::new();

    let state = p.verify_page(&login_page(), &settings, &TraceLogger::disabled());
    assert_eq!(state, ActivationState::Inactive);
    assert_eq!(p.analysis().unwrap().page_type, PageClassification::NoForms);
}

#[test]
fn disabled_scorer_finds_no_forms() {
    let config = PipelineConfig {
        scorer_kind: ScorerKind::Disabled,
        ..PipelineConfig::default()
    };
    let mut p = Pipeline::assemble(config, SitePolicy::with_defaults());
    let settings = InMemorySettings::new();

    let state = p.verify_page(&login_page(), &settings, &TraceLogger::disabled());
    assert_eq!(state, ActivationState::Inactive);
}

// =========================================================================
// Command handling
// =========================================================================

#[test]
fn scan_forms_reports_each_legitimate_candidate() {
    let mut p = pipeline();
    let mut settings = InMemorySettings::new();
    let mut sink = CollectingSink::default();
    let tracer = TraceLogger::disabled();
    let doc = login_page();
    p.verify_page(&doc, &settings, &tracer);

    handle_command(Command::ScanForms, &mut p, &doc, &mut settings, &mut sink, &tracer);

    assert_eq!(sink.messages.len(), 1);
    match &sink.messages[0] {
        OutboundMessage::FormDetected { form_id, fields, form_context } => {
            assert_eq!(form_id, "login");
            assert_eq!(fields.len(), 2);
            assert_eq!(form_context, "login form");
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn scan_on_formless_page_reports_no_forms() {
    let mut p = pipeline();
    let mut settings = InMemorySettings::new();
    let mut sink = CollectingSink::default();
    let tracer = TraceLogger::disabled();
    let doc = empty_page();

    handle_command(Command::ScanForms, &mut p, &doc, &mut settings, &mut sink, &tracer);
    assert!(matches!(sink.messages[0], OutboundMessage::NoFormsFound {}));
}

#[test]
fn get_activation_state_reports_current_state() {
    let mut p = pipeline();
    let mut settings = InMemorySettings::new();
    let mut sink = CollectingSink::default();
    let tracer = TraceLogger::disabled();
    let doc = login_page();
    p.verify_page(&doc, &settings, &tracer);

    handle_command(Command::GetActivationState, &mut p, &doc, &mut settings, &mut sink, &tracer);
    match &sink.messages[0] {
        OutboundMessage::ActivationStateChanged { state, url } => {
            assert_eq!(state, "minimal");
            assert_eq!(url, &doc.url);
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn force_activate_command_overrides_and_reports() {
    let mut p = pipeline();
    let mut settings = InMemorySettings::new();
    let mut sink = CollectingSink::default();
    let tracer = TraceLogger::disabled();
    let doc = empty_page();
    p.verify_page(&doc, &settings, &tracer);

    handle_command(
        Command::ForceActivate { state: "active".to_string(), reason: "user".to_string() },
        &mut p,
        &doc,
        &mut settings,
        &mut sink,
        &tracer,
    );

    assert_eq!(p.gate.state(), ActivationState::Active);
    assert_eq!(p.gate.stack().last().unwrap().checkpoint, Checkpoint::ManualOverride);
    match &sink.messages[0] {
        OutboundMessage::ActivationStateChanged { state, .. } => assert_eq!(state, "active"),
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn toggling_developer_mode_reverifies() {
    let mut p = pipeline();
    let mut settings = InMemorySettings::new();
    let mut sink = CollectingSink::default();
    let tracer = TraceLogger::disabled();
    let doc = empty_page();
    p.verify_page(&doc, &settings, &tracer);

    handle_command(
        Command::ToggleDeveloperMode { enabled: true },
        &mut p,
        &doc,
        &mut settings,
        &mut sink,
        &tracer,
    );

    assert!(settings.get_bool(keys::DEVELOPER_MODE, false));
    assert_eq!(p.gate.state(), ActivationState::Developer);
    match &sink.messages[0] {
        OutboundMessage::ActivationStateChanged { state, .. } => assert_eq!(state, "developer"),
        other => panic!("unexpected message {:?}", other),
    }
}

// =========================================================================
// Diagnostics
// =========================================================================

#[test]
fn diagnostic_report_captures_the_whole_pass() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let doc = login_page();
    p.verify_page(&doc, &settings, &TraceLogger::disabled());

    let report = p.diagnostic_report(settings.snapshot());
    assert_eq!(report.url, doc.url);
    assert_eq!(report.activation_state, "minimal");
    assert!(report.blocklist_report.allowed);
    assert_eq!(report.verification_stack.len(), 5);
    assert!(report.form_analysis.is_object());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["activationState"], json!("minimal"));
    assert!(value["verificationStack"].is_array());
}

#[test]
fn diagnostic_report_travels_as_an_outbound_message() {
    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let doc = login_page();
    p.verify_page(&doc, &settings, &TraceLogger::disabled());

    let msg = OutboundMessage::DiagnosticReport(p.diagnostic_report(settings.snapshot()));
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["type"], json!("diagnosticReport"));
    assert_eq!(value["activationState"], json!("minimal"));
    assert_eq!(value["url"], json!(doc.url));
}

#[test]
fn message_serialize_errors_chain_their_source() {
    let source = serde_json::from_str::<u32>("not json").unwrap_err();
    let err = DetectError::MessageSerialize {
        context: "diagnostic report".to_string(),
        source,
    };
    assert!(err.to_string().contains("diagnostic report"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn trace_logger_writes_json_lines() {
    let path = std::env::temp_dir().join(format!("fd-trace-{}.jsonl", std::process::id()));
    let path_str = path.to_str().unwrap().to_string();
    let _ = std::fs::remove_file(&path);

    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let tracer = TraceLogger::new(&path_str);
    p.verify_page(&login_page(), &settings, &tracer);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(!lines.is_empty());
    let event: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["stage"], json!("verification"));
    assert_eq!(event["state"], json!("minimal"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn trace_events_below_the_minimum_level_are_dropped() {
    let path = std::env::temp_dir().join(format!("fd-trace-level-{}.jsonl", std::process::id()));
    let path_str = path.to_str().unwrap().to_string();
    let _ = std::fs::remove_file(&path);

    let tracer = TraceLogger::new(&path_str).with_min_level(TraceLevel::Warn);
    tracer.log(&TraceEvent::now(1, "verification").with_state("minimal"));
    tracer.log(
        &TraceEvent::now(1, "delivery")
            .with_level(TraceLevel::Error)
            .with_message("sink failure"),
    );

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["level"], json!("error"));
    assert_eq!(event["stage"], json!("delivery"));

    assert_eq!(TraceLevel::parse("warning"), TraceLevel::Warn);
    assert_eq!(TraceLevel::parse("nonsense"), TraceLevel::Info);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn candidate_scoring_traces_only_at_debug() {
    let path = std::env::temp_dir().join(format!("fd-trace-debug-{}.jsonl", std::process::id()));
    let path_str = path.to_str().unwrap().to_string();
    let _ = std::fs::remove_file(&path);

    let mut p = pipeline();
    let settings = InMemorySettings::new();
    let tracer = TraceLogger::new(&path_str).with_min_level(TraceLevel::Debug);
    p.verify_page(&login_page(), &settings, &tracer);

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(events.iter().any(|e| e["stage"] == json!("scoring") && e["level"] == json!("debug")));
    assert!(events.iter().any(|e| e["stage"] == json!("verification")));

    let _ = std::fs::remove_file(&path);
}

// =========================================================================
// Message boundary
// =========================================================================

#[test]
fn outbound_messages_use_the_wire_shape() {
    let msg = OutboundMessage::ActivationStateChanged {
        state: "active".to_string(),
        url: "https://example.com/login".to_string(),
    };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["type"], json!("activationStateChanged"));
    assert_eq!(value["state"], json!("active"));

    let none = serde_json::to_value(OutboundMessage::NoFormsFound {}).unwrap();
    assert_eq!(none["type"], json!("noFormsFound"));
}

#[test]
fn commands_parse_from_the_wire_shape() {
    let scan: Command = serde_json::from_value(json!({ "command": "scanForms" })).unwrap();
    assert_eq!(scan, Command::ScanForms);

    let force: Command = serde_json::from_value(json!({
        "command": "forceActivate", "state": "active", "reason": "debugging"
    }))
    .unwrap();
    assert_eq!(
        force,
        Command::ForceActivate { state: "active".to_string(), reason: "debugging".to_string() }
    );
}

#[test]
fn closed_channel_is_swallowed() {
    struct ClosedSink;
    impl MessageSink for ClosedSink {
        fn deliver(&mut self, _m: &OutboundMessage) -> Result<(), DeliveryError> {
            Err(DeliveryError::ChannelClosed)
        }
    }

    let mut sink = ClosedSink;
    // Must not panic or retry
    send(&mut sink, &OutboundMessage::NoFormsFound {}, &TraceLogger::disabled());
}
