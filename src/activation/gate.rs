use serde::Serialize;

use crate::activation::verification::{
    Checkpoint, CheckpointResult, VerificationRecord, VerificationStack,
};
use crate::page::page_model::PageClassification;
use crate::policy::site_policy::PolicyDecision;
use crate::settings::store::{SettingsStore, keys};

// ============================================================================
// Activation gate — the one stateful component. Owns the current state and
// the verification stack for the lifetime of a page view, and is the only
// component allowed to trigger UI side effects (via its subscribers).
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Blocked,
    Inactive,
    Minimal,
    Active,
    Developer,
}

impl ActivationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationState::Blocked => "blocked",
            ActivationState::Inactive => "inactive",
            ActivationState::Minimal => "minimal",
            ActivationState::Active => "active",
            ActivationState::Developer => "developer",
        }
    }

    /// States with a visible surface. Structural-change observation must
    /// never downgrade these.
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            ActivationState::Minimal | ActivationState::Active | ActivationState::Developer
        )
    }
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type Subscriber = Box<dyn FnMut(ActivationState)>;

pub struct ActivationGate {
    state: ActivationState,
    stack: VerificationStack,
    subscribers: Vec<Subscriber>,
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationGate {
    pub fn new() -> Self {
        Self {
            state: ActivationState::Inactive,
            stack: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn stack(&self) -> &VerificationStack {
        &self.stack
    }

    /// Subscribers are called synchronously on every state transition.
    pub fn subscribe(&mut self, callback: impl FnMut(ActivationState) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    fn settle(&mut self, state: ActivationState) -> ActivationState {
        let changed = self.state != state;
        self.state = state;
        if changed {
            for sub in &mut self.subscribers {
                sub(state);
            }
        }
        state
    }

    /// Run one full verification pass. Checkpoints run in strict order,
    /// first match wins; every checkpoint reached is recorded. The stack is
    /// rebuilt wholesale — a pass runs to completion before another starts.
    ///
    /// `page_verdict` is `None` when the analysis collaborators could not be
    /// set up; the gate then settles `minimal`, the safest permissive
    /// default (under-activation is the safe failure direction).
    pub fn verify(
        &mut self,
        settings: &dyn SettingsStore,
        host: &str,
        policy: &PolicyDecision,
        page_verdict: Option<PageClassification>,
    ) -> ActivationState {
        self.stack.clear();

        // 1. Developer mode overrides everything
        if settings.get_bool(keys::DEVELOPER_MODE, false) {
            self.stack.push(VerificationRecord::now(
                Checkpoint::DeveloperModeCheck,
                CheckpointResult::OverrideDeveloper,
                "developer mode enabled",
            ));
            return self.settle(ActivationState::Developer);
        }
        self.stack.push(VerificationRecord::now(
            Checkpoint::DeveloperModeCheck,
            CheckpointResult::Passed,
            "developer mode off",
        ));

        // 2. Site policy
        if !policy.allowed {
            self.stack.push(VerificationRecord::now(
                Checkpoint::SitePolicyCheck,
                CheckpointResult::Blocked,
                policy.reason.clone(),
            ));
            return self.settle(ActivationState::Blocked);
        }
        self.stack.push(VerificationRecord::now(
            Checkpoint::SitePolicyCheck,
            CheckpointResult::Passed,
            policy.reason.clone(),
        ));

        // 3. User disabled this site
        let site = settings.site_override(host);
        let globally_enabled = settings.get_bool(keys::ENABLED, true);
        if !globally_enabled || site.as_ref().is_some_and(|o| o.enabled == Some(false)) {
            self.stack.push(VerificationRecord::now(
                Checkpoint::SiteDisabledCheck,
                CheckpointResult::SiteDisabled,
                if globally_enabled {
                    format!("user disabled '{}'", host)
                } else {
                    "globally disabled".to_string()
                },
            ));
            return self.settle(ActivationState::Inactive);
        }
        self.stack.push(VerificationRecord::now(
            Checkpoint::SiteDisabledCheck,
            CheckpointResult::Passed,
            "site enabled",
        ));

        // 4. User force-activate override
        if site.as_ref().is_some_and(|o| o.force_activate == Some(true)) {
            self.stack.push(VerificationRecord::now(
                Checkpoint::ForceActivateCheck,
                CheckpointResult::ForceActivated,
                format!("user force-activated '{}'", host),
            ));
            return self.settle(ActivationState::Active);
        }
        self.stack.push(VerificationRecord::now(
            Checkpoint::ForceActivateCheck,
            CheckpointResult::Passed,
            "no site override",
        ));

        // 5. Page analyzer verdict
        let (result, state, message) = match page_verdict {
            Some(PageClassification::PrimaryForm) => (
                CheckpointResult::PrimaryForm,
                ActivationState::Active,
                "primary form page",
            ),
            Some(PageClassification::HasForms) => (
                CheckpointResult::HasForms,
                ActivationState::Minimal,
                "page has forms",
            ),
            Some(PageClassification::NoForms) | Some(PageClassification::Excluded) => (
                CheckpointResult::NoForms,
                ActivationState::Inactive,
                "no assistable forms",
            ),
            None => (
                CheckpointResult::FallbackMinimal,
                ActivationState::Minimal,
                "analysis unavailable, permissive default",
            ),
        };
        self.stack.push(VerificationRecord::now(
            Checkpoint::PageAnalysisCheck,
            result,
            message,
        ));
        self.settle(state)
    }

    /// Manual override: bypasses the pipeline, recorded as an override
    /// checkpoint appended to the current stack.
    pub fn force_activate(&mut self, state: ActivationState, reason: &str) -> ActivationState {
        self.stack.push(VerificationRecord::now(
            Checkpoint::ManualOverride,
            CheckpointResult::ManualOverride,
            reason.to_string(),
        ));
        self.settle(state)
    }

    /// The minimal affordance was interacted with: promote to active
    /// without re-running verification. No-op in any other state.
    pub fn promote_minimal(&mut self) -> ActivationState {
        if self.state == ActivationState::Minimal {
            return self.settle(ActivationState::Active);
        }
        self.state
    }

    /// Whether an asynchronous structural-change observation may trigger
    /// re-verification. Only an invisible, non-blocked state may be
    /// upgraded; visible states are never flickered away.
    pub fn may_reverify_on_structural_change(&self) -> bool {
        self.state == ActivationState::Inactive
    }
}
