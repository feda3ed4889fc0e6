use clap::Parser;
use serde_json::Value;

use form_detection::cli::config::{Cli, Commands, build_pipeline_config, build_policy, load_config};
use form_detection::pipeline::ScorerKind;
use form_detection::policy::site_policy::PolicyStore;
use form_detection::settings::store::{InMemorySettings, SettingsStore, load_settings};

// =========================================================================
// Argument parsing
// =========================================================================

#[test]
fn parses_analyze_with_flags() {
    let cli = Cli::try_parse_from([
        "form-detection", "analyze", "--snapshot", "page.json", "--strict", "--format", "json", "-vv",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Analyze { snapshot, strict, format } => {
            assert_eq!(snapshot, "page.json");
            assert!(strict);
            assert_eq!(format, "json");
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn score_defaults_to_first_candidate() {
    let cli = Cli::try_parse_from(["form-detection", "score", "--snapshot", "page.json"]).unwrap();
    match cli.command {
        Commands::Score { index, .. } => assert_eq!(index, 0),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn config_path_is_global() {
    let cli = Cli::try_parse_from([
        "form-detection", "diagnose", "--snapshot", "page.json", "--config", "custom.yaml",
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
}

#[test]
fn missing_snapshot_argument_is_an_error() {
    assert!(Cli::try_parse_from(["form-detection", "analyze"]).is_err());
}

// =========================================================================
// Config file loading
// =========================================================================

fn temp_file(name: &str, content: &str) -> String {
    let path = std::env::temp_dir().join(format!("fd-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn missing_config_yields_defaults() {
    let config = load_config(Some("/nonexistent/form-detection.yaml"));
    assert_eq!(config.scoring.threshold, 75.0);
    assert!(!config.scoring.strict);
    assert_eq!(config.scoring.primary_field_threshold, 5);
    assert!(config.trace.file.is_none());
}

#[test]
fn malformed_config_yields_defaults() {
    let path = temp_file("bad.yaml", "scoring: [not, a, map]");
    let config = load_config(Some(&path));
    assert_eq!(config.scoring.threshold, 75.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn config_file_values_are_applied() {
    let yaml = r#"
scoring:
  threshold: 60.0
  strict: true
policy:
  blocked_domains:
    - example.net
  form_hosts:
    - forms.internal.example.com
  exceptions:
    - domain: example.net
      paths: ["/login"]
trace:
  file: /tmp/trace.jsonl
"#;
    let path = temp_file("full.yaml", yaml);
    let config = load_config(Some(&path));
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.scoring.threshold, 60.0);
    assert!(config.scoring.strict);
    assert_eq!(config.trace.file.as_deref(), Some("/tmp/trace.jsonl"));

    let policy = build_policy(&config);
    assert!(!policy.evaluate("example.net", "/news").allowed);
    assert!(policy.evaluate("example.net", "/login").allowed);
    assert!(policy.is_form_host("forms.internal.example.com"));
}

#[test]
fn strict_flag_merges_into_pipeline_config() {
    let config = load_config(Some("/nonexistent/form-detection.yaml"));
    let lax = build_pipeline_config(&config, false);
    assert!(!lax.scoring.strict);
    assert_eq!(lax.scorer_kind, ScorerKind::Weighted);

    let strict = build_pipeline_config(&config, true);
    assert!(strict.scoring.strict);
    assert_eq!(strict.scoring.threshold, 75.0);
}

// =========================================================================
// Settings file loading
// =========================================================================

#[test]
fn missing_settings_yield_defaults() {
    let settings = load_settings(Some("/nonexistent/settings.yaml"));
    assert!(settings.get_bool("enabled", true));
    assert!(!settings.get_bool("developer_mode", false));
}

#[test]
fn settings_file_values_and_overrides_load() {
    let yaml = r#"
values:
  developer_mode: true
  log_verbosity: "debug"
site_overrides:
  example.com:
    enabled: false
  "*.shop.example.com":
    force_activate: true
"#;
    let path = temp_file("settings.yaml", yaml);
    let settings = load_settings(Some(&path));
    let _ = std::fs::remove_file(&path);

    assert!(settings.get_bool("developer_mode", false));
    assert_eq!(settings.get_str("log_verbosity", "info"), "debug");
    assert_eq!(settings.site_override("example.com").unwrap().enabled, Some(false));
    assert_eq!(
        settings.site_override("cart.shop.example.com").unwrap().force_activate,
        Some(true)
    );
}

#[test]
fn settings_snapshot_round_trips() {
    let mut settings = InMemorySettings::new();
    settings.set("enabled", Value::Bool(false));

    let snapshot = settings.snapshot();
    assert_eq!(snapshot["values"]["enabled"], Value::Bool(false));

    let restored: InMemorySettings = serde_json::from_value(snapshot).unwrap();
    assert!(!restored.get_bool("enabled", true));
}
