use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event severity, ordered so a minimum level can gate emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl TraceLevel {
    /// Lenient parse for the `log_verbosity` setting; unknown values fall
    /// back to Info.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "debug" => TraceLevel::Debug,
            "warn" | "warning" => TraceLevel::Warn,
            "error" => TraceLevel::Error,
            _ => TraceLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TraceLevel::Debug => "debug",
            TraceLevel::Info => "info",
            TraceLevel::Warn => "warn",
            TraceLevel::Error => "error",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub pass: u64,

    /// Pipeline stage or checkpoint the event belongs to
    pub stage: String,
    pub level: TraceLevel,

    pub state: Option<String>,
    pub message: Option<String>,
    pub score: Option<f32>,
}

impl TraceEvent {
    pub fn now(pass: u64, stage: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            pass,
            stage: stage.to_string(),
            level: TraceLevel::Info,
            state: None,
            message: None,
            score: None,
        }
    }

    pub fn with_level(mut self, level: TraceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_state(mut self, state: impl ToString) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}
