use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::page::analyzer::AnalyzerConfig;
use crate::pipeline::PipelineConfig;
use crate::policy::site_policy::{BlockCategory, SitePolicy};
use crate::scoring::score_model::ScoringConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-detection",
    version,
    about = "Heuristic form detection and activation pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-detection.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to a YAML settings file (user/site overrides)
    #[arg(long, global = true)]
    pub settings: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline on a document snapshot
    Analyze {
        /// Path to a snapshot JSON file
        #[arg(long)]
        snapshot: String,

        /// Enable strict-mode scoring
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Output format: console, json
        #[arg(long, default_value = "console")]
        format: String,
    },

    /// Print one candidate's full score breakdown
    Score {
        /// Path to a snapshot JSON file
        #[arg(long)]
        snapshot: String,

        /// Candidate index (document order)
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Emit the diagnostic report as JSON
    Diagnose {
        /// Path to a snapshot JSON file
        #[arg(long)]
        snapshot: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-detection.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub trace: TraceSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSection {
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_primary_fields")]
    pub primary_field_threshold: usize,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            threshold: 75.0,
            strict: false,
            primary_field_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySection {
    /// Extra domains to block (category "other")
    #[serde(default)]
    pub blocked_domains: Vec<String>,

    /// Extra dedicated form hosts
    #[serde(default)]
    pub form_hosts: Vec<String>,

    /// Extra path-scoped exceptions
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionEntry {
    pub domain: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceSection {
    pub file: Option<String>,
}

// Serde default helpers
fn default_threshold() -> f32 {
    75.0
}
fn default_primary_fields() -> usize {
    5
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or
/// malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-detection.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Builders (merge CLI args with config file)
// ============================================================================

pub fn build_pipeline_config(config: &AppConfig, strict_flag: bool) -> PipelineConfig {
    PipelineConfig {
        scoring: ScoringConfig {
            threshold: config.scoring.threshold,
            strict: config.scoring.strict || strict_flag,
        },
        analyzer: AnalyzerConfig {
            primary_field_threshold: config.scoring.primary_field_threshold,
            ..AnalyzerConfig::default()
        },
        ..PipelineConfig::default()
    }
}

pub fn build_policy(config: &AppConfig) -> SitePolicy {
    let mut policy = SitePolicy::with_defaults();
    for domain in &config.policy.blocked_domains {
        policy.add_blocked_domain(domain, BlockCategory::Other);
    }
    for host in &config.policy.form_hosts {
        policy.add_form_host(host);
    }
    for e in &config.policy.exceptions {
        policy.add_exception(&e.domain, e.paths.clone());
    }
    policy
}
