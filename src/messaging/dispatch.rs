use serde_json::Value;

use crate::activation::gate::ActivationState;
use crate::dom::dom_model::DocumentSnapshot;
use crate::messaging::messages::{Command, MessageSink, OutboundMessage, send};
use crate::pipeline::Pipeline;
use crate::settings::store::{SettingsStore, keys};
use crate::trace::logger::TraceLogger;

fn parse_state(s: &str) -> Option<ActivationState> {
    match s {
        "blocked" => Some(ActivationState::Blocked),
        "inactive" => Some(ActivationState::Inactive),
        "minimal" => Some(ActivationState::Minimal),
        "active" => Some(ActivationState::Active),
        "developer" => Some(ActivationState::Developer),
        _ => None,
    }
}

/// Handle one inbound command against the current page view. Responses go
/// through the sink, fire-and-forget.
pub fn handle_command(
    command: Command,
    pipeline: &mut Pipeline,
    doc: &DocumentSnapshot,
    settings: &mut dyn SettingsStore,
    sink: &mut dyn MessageSink,
    tracer: &TraceLogger,
) {
    match command {
        Command::ScanForms => {
            for message in pipeline.scan_messages(doc) {
                send(sink, &message, tracer);
            }
        }
        Command::GetActivationState => {
            send(
                sink,
                &OutboundMessage::ActivationStateChanged {
                    state: pipeline.gate.state().as_str().to_string(),
                    url: doc.url.clone(),
                },
                tracer,
            );
        }
        Command::ForceActivate { state, reason } => {
            // Manual override: bypasses verification, recorded on the stack
            let target = parse_state(&state).unwrap_or(ActivationState::Active);
            pipeline.gate.force_activate(target, &reason);
            send(
                sink,
                &OutboundMessage::ActivationStateChanged {
                    state: pipeline.gate.state().as_str().to_string(),
                    url: doc.url.clone(),
                },
                tracer,
            );
        }
        Command::ToggleDeveloperMode { enabled } => {
            settings.set(keys::DEVELOPER_MODE, Value::Bool(enabled));
            let state = pipeline.verify_page(doc, settings, tracer);
            send(
                sink,
                &OutboundMessage::ActivationStateChanged {
                    state: state.as_str().to_string(),
                    url: doc.url.clone(),
                },
                tracer,
            );
        }
    }
}
