use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::trace::trace::{TraceEvent, TraceLevel};

/// JSONL trace sink with a minimum level. Degrades gracefully: an
/// unopenable file disables tracing with a stderr warning, and every later
/// failure is swallowed — diagnostics must never take the pipeline down.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
    min_level: TraceLevel,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
                min_level: TraceLevel::Info,
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self {
                    file: None,
                    min_level: TraceLevel::Info,
                }
            }
        }
    }

    /// A logger that drops everything; used when tracing is off.
    pub fn disabled() -> Self {
        Self {
            file: None,
            min_level: TraceLevel::Info,
        }
    }

    /// Events below `level` are dropped without being serialized.
    pub fn with_min_level(mut self, level: TraceLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn log(&self, event: &TraceEvent) {
        if event.level < self.min_level {
            return;
        }
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            eprintln!("Warning: failed to write trace event: {}", e);
        }
    }
}
