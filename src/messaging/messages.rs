use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::activation::verification::VerificationStack;
use crate::field::field_model::FieldDescriptor;
use crate::policy::site_policy::PolicyDecision;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{TraceEvent, TraceLevel};

// ============================================================================
// Message boundary — one-way payloads to the host/UI layer, and the
// commands the core accepts. Delivery is fire-and-forget: the receiving
// context may legitimately no longer exist.
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    #[serde(rename_all = "camelCase")]
    ActivationStateChanged { state: String, url: String },
    #[serde(rename_all = "camelCase")]
    FormDetected {
        form_id: String,
        fields: Vec<FieldDescriptor>,
        form_context: String,
    },
    NoFormsFound {},
    DiagnosticReport(DiagnosticReport),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub url: String,
    pub verification_stack: VerificationStack,
    pub activation_state: String,
    pub blocklist_report: PolicyDecision,
    pub form_analysis: Value,
    pub settings_snapshot: Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    ScanForms,
    GetActivationState,
    #[serde(rename_all = "camelCase")]
    ForceActivate { state: String, reason: String },
    #[serde(rename_all = "camelCase")]
    ToggleDeveloperMode { enabled: bool },
}

// ============================================================================
// Delivery
// ============================================================================

#[derive(Debug)]
pub enum DeliveryError {
    /// Receiving end is gone (panel closed, context torn down) — expected
    ChannelClosed,
    /// Anything else — unexpected
    Sink(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::ChannelClosed => write!(f, "receiving end gone"),
            DeliveryError::Sink(msg) => write!(f, "sink failure: {}", msg),
        }
    }
}

pub trait MessageSink {
    fn deliver(&mut self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Send one message, swallowing delivery failures. A closed channel is
/// routine (warn); anything else is logged at error level. Never retried.
pub fn send(sink: &mut dyn MessageSink, message: &OutboundMessage, tracer: &TraceLogger) {
    match sink.deliver(message) {
        Ok(()) => {}
        Err(DeliveryError::ChannelClosed) => {
            tracer.log(
                &TraceEvent::now(0, "delivery")
                    .with_level(TraceLevel::Warn)
                    .with_message("message dropped: receiving end gone"),
            );
        }
        Err(e) => {
            tracer.log(
                &TraceEvent::now(0, "delivery")
                    .with_level(TraceLevel::Error)
                    .with_message(format!("message delivery failed: {}", e)),
            );
        }
    }
}

/// Sink that retains every message; used by the CLI and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub messages: Vec<OutboundMessage>,
}

impl MessageSink for CollectingSink {
    fn deliver(&mut self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        self.messages.push(message.clone());
        Ok(())
    }
}
