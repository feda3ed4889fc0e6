use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Settings store — the persistent-state collaborator. The core consumes it
// through the trait and never assumes a load succeeded: a failed load is
// "use defaults", never a pipeline failure.
// ============================================================================

pub mod keys {
    pub const ENABLED: &str = "enabled";
    pub const DEVELOPER_MODE: &str = "developer_mode";
    pub const VALIDATION_STRICTNESS: &str = "validation_strictness";
    pub const LOG_VERBOSITY: &str = "log_verbosity";
}

/// Per-site user override, keyed by hostname (exact or `*.suffix`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub force_activate: Option<bool>,
    #[serde(default)]
    pub validation_level: Option<String>,
    #[serde(default)]
    pub updated_at_ms: u128,
}

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    /// Site override lookup: exact hostname first, then wildcard-suffix
    /// entries (`*.example.com`)
    fn site_override(&self, host: &str) -> Option<SiteOverride>;
    fn set_site_override(&mut self, host: &str, value: SiteOverride);

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn get_str(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| default.to_string())
    }
}

// ============================================================================
// In-memory implementation (also the deserialization target for the YAML
// settings file)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySettings {
    #[serde(default)]
    values: BTreeMap<String, Value>,
    #[serde(default)]
    site_overrides: BTreeMap<String, SiteOverride>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn with_site_override(mut self, host: &str, value: SiteOverride) -> Self {
        self.site_overrides.insert(host.to_string(), value);
        self
    }

    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn site_override(&self, host: &str) -> Option<SiteOverride> {
        if let Some(o) = self.site_overrides.get(host) {
            return Some(o.clone());
        }
        // Wildcard-suffix entries: "*.example.com" covers any subdomain
        let mut rest = host;
        while let Some(pos) = rest.find('.') {
            rest = &rest[pos + 1..];
            if let Some(o) = self.site_overrides.get(&format!("*.{}", rest)) {
                return Some(o.clone());
            }
        }
        None
    }

    fn set_site_override(&mut self, host: &str, value: SiteOverride) {
        self.site_overrides.insert(host.to_string(), value);
    }
}

/// Load settings from a YAML file. Any failure (missing file, bad YAML)
/// yields defaults — under-configuration is never fatal.
pub fn load_settings(path: Option<&str>) -> InMemorySettings {
    let path = path.unwrap_or("form-detection-settings.yaml");
    match std::fs::read_to_string(path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => InMemorySettings::default(),
    }
}
