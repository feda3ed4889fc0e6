use serde_json::Value;

use crate::activation::gate::{ActivationGate, ActivationState};
use crate::dom::dom_model::DocumentSnapshot;
use crate::messaging::messages::{DiagnosticReport, OutboundMessage};
use crate::page::analyzer::{AnalyzerConfig, PageAnalyzer};
use crate::page::page_model::{PageAnalysis, PageClassification};
use crate::policy::site_policy::{PolicyStore, SitePolicy};
use crate::scoring::legitimacy::{NoopScorer, Scorer, WeightedScorer};
use crate::scoring::score_model::ScoringConfig;
use crate::semantic::classifier::{ArchetypeClassifier, Classifier, NoopClassifier};
use crate::settings::store::SettingsStore;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{TraceEvent, TraceLevel};

// ============================================================================
// Pipeline assembly — wires one instance of every component per page view.
// All collaborators are passed in explicitly; nothing lives in a global.
// ============================================================================

/// Capability selection, decided by configuration up front rather than
/// feature-detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerKind {
    #[default]
    Weighted,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    #[default]
    Archetype,
    Disabled,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub scoring: ScoringConfig,
    pub analyzer: AnalyzerConfig,
    pub scorer_kind: ScorerKind,
    pub classifier_kind: ClassifierKind,
}

pub struct Pipeline {
    pub policy: SitePolicy,
    pub analyzer: PageAnalyzer,
    pub gate: ActivationGate,
    pass: u64,
}

impl Pipeline {
    pub fn assemble(config: PipelineConfig, policy: SitePolicy) -> Self {
        let scorer: Box<dyn Scorer> = match config.scorer_kind {
            ScorerKind::Weighted => Box::new(WeightedScorer::new(config.scoring)),
            ScorerKind::Disabled => Box::new(NoopScorer),
        };
        let classifier: Box<dyn Classifier> = match config.classifier_kind {
            ClassifierKind::Archetype => Box::new(ArchetypeClassifier),
            ClassifierKind::Disabled => Box::new(NoopClassifier),
        };
        Self {
            policy,
            analyzer: PageAnalyzer::new(scorer, classifier, config.analyzer),
            gate: ActivationGate::new(),
            pass: 0,
        }
    }

    /// One full verification pass over a page snapshot: analyze, gate,
    /// trace. Runs to completion; calling it again simply starts a fresh,
    /// independent pass.
    pub fn verify_page(
        &mut self,
        doc: &DocumentSnapshot,
        settings: &dyn SettingsStore,
        tracer: &TraceLogger,
    ) -> ActivationState {
        self.pass += 1;
        let host = doc.host();
        let path = doc.path();
        let decision = self.policy.evaluate(&host, &path);
        let analysis = self.analyzer.analyze(doc, &self.policy);
        let page_type = analysis.page_type;

        for c in &analysis.candidates {
            tracer.log(
                &TraceEvent::now(self.pass, "scoring")
                    .with_level(TraceLevel::Debug)
                    .with_score(c.verdict.score)
                    .with_message(format!(
                        "candidate={} type={}",
                        c.candidate.identifier, c.classification.form_type
                    )),
            );
        }

        let state = self
            .gate
            .verify(settings, &host, &decision, Some(page_type));

        tracer.log(
            &TraceEvent::now(self.pass, "verification")
                .with_state(state)
                .with_message(format!("page={} host={}", page_type.as_str(), host)),
        );
        state
    }

    /// Asynchronous structural-change observation. Only ever upgrades an
    /// inactive state; visible states are left alone to prevent flicker.
    pub fn structural_change(
        &mut self,
        doc: &DocumentSnapshot,
        settings: &dyn SettingsStore,
        tracer: &TraceLogger,
    ) -> Option<ActivationState> {
        if !self.gate.may_reverify_on_structural_change() {
            return None;
        }
        self.analyzer.notice_structural_change(doc, &self.policy)?;
        Some(self.verify_page(doc, settings, tracer))
    }

    pub fn analysis(&self) -> Option<&PageAnalysis> {
        self.analyzer.cached()
    }

    /// Result of an on-demand scan: one message per legitimate candidate,
    /// or a single no-forms message.
    pub fn scan_messages(&mut self, doc: &DocumentSnapshot) -> Vec<OutboundMessage> {
        let analysis = self.analyzer.analyze(doc, &self.policy);
        let mut out = Vec::new();
        for (i, c) in analysis
            .candidates
            .iter()
            .filter(|c| c.is_legitimate())
            .enumerate()
        {
            let form_id = if c.candidate.identifier.is_empty() {
                format!("form-{}", i)
            } else {
                c.candidate.identifier.clone()
            };
            out.push(OutboundMessage::FormDetected {
                form_id,
                fields: c.candidate.fields.clone(),
                form_context: c.classification.form_type.clone(),
            });
        }
        if out.is_empty() {
            out.push(OutboundMessage::NoFormsFound {});
        }
        out
    }

    pub fn diagnostic_report(&self, settings_snapshot: Value) -> DiagnosticReport {
        let (url, blocklist_report, form_analysis) = match self.analyzer.cached() {
            Some(a) => (
                a.context.url.clone(),
                self.policy.evaluate(&a.context.host, &a.context.path),
                serde_json::to_value(a).unwrap_or(Value::Null),
            ),
            None => (
                String::new(),
                self.policy.evaluate("", "/"),
                Value::Null,
            ),
        };
        DiagnosticReport {
            url,
            verification_stack: self.gate.stack().clone(),
            activation_state: self.gate.state().as_str().to_string(),
            blocklist_report,
            form_analysis,
            settings_snapshot,
        }
    }
}

/// Convenience used by tests and the CLI: page classification alone,
/// without touching activation state.
pub fn classify_page(
    doc: &DocumentSnapshot,
    config: PipelineConfig,
    policy: &SitePolicy,
) -> PageClassification {
    let scorer: Box<dyn Scorer> = Box::new(WeightedScorer::new(config.scoring));
    let classifier: Box<dyn Classifier> = Box::new(ArchetypeClassifier);
    let mut analyzer = PageAnalyzer::new(scorer, classifier, config.analyzer);
    analyzer.analyze(doc, policy).page_type
}
