use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Verification stack — append-only record of one verification pass.
// Cleared and rebuilt wholesale at the start of each pass, never partially
// mutated.
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    DeveloperModeCheck,
    SitePolicyCheck,
    SiteDisabledCheck,
    ForceActivateCheck,
    PageAnalysisCheck,
    ManualOverride,
}

impl Checkpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Checkpoint::DeveloperModeCheck => "developer_mode_check",
            Checkpoint::SitePolicyCheck => "site_policy_check",
            Checkpoint::SiteDisabledCheck => "site_disabled_check",
            Checkpoint::ForceActivateCheck => "force_activate_check",
            Checkpoint::PageAnalysisCheck => "page_analysis_check",
            Checkpoint::ManualOverride => "manual_override",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointResult {
    /// Checkpoint did not fire; verification continued
    Passed,
    OverrideDeveloper,
    Blocked,
    SiteDisabled,
    ForceActivated,
    PrimaryForm,
    HasForms,
    NoForms,
    /// Analysis collaborator was unavailable; safest permissive default
    FallbackMinimal,
    ManualOverride,
}

impl CheckpointResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointResult::Passed => "PASSED",
            CheckpointResult::OverrideDeveloper => "OVERRIDE_DEVELOPER",
            CheckpointResult::Blocked => "BLOCKED",
            CheckpointResult::SiteDisabled => "SITE_DISABLED",
            CheckpointResult::ForceActivated => "FORCE_ACTIVATED",
            CheckpointResult::PrimaryForm => "PRIMARY_FORM",
            CheckpointResult::HasForms => "HAS_FORMS",
            CheckpointResult::NoForms => "NO_FORMS",
            CheckpointResult::FallbackMinimal => "FALLBACK_MINIMAL",
            CheckpointResult::ManualOverride => "MANUAL_OVERRIDE",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord {
    pub checkpoint: Checkpoint,
    pub result: CheckpointResult,
    pub message: String,
    pub timestamp_ms: u128,
}

impl VerificationRecord {
    pub fn now(checkpoint: Checkpoint, result: CheckpointResult, message: impl Into<String>) -> Self {
        Self {
            checkpoint,
            result,
            message: message.into(),
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
        }
    }
}

pub type VerificationStack = Vec<VerificationRecord>;
