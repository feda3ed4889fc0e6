use crate::dom::dom_model::DocumentSnapshot;
use crate::exclusion::detectors::{detect_document_editor, run_filters};
use crate::field::extractor::{
    ExtractorOptions, build_candidate, is_interactive_control, matched_action_words,
};
use crate::field::field_model::CandidateSource;
use crate::page::page_model::{
    CandidateAnalysis, PageAnalysis, PageClassification, PageContext,
};
use crate::policy::site_policy::PolicyStore;
use crate::scoring::legitimacy::Scorer;
use crate::semantic::classifier::Classifier;

// ============================================================================
// Page analysis — aggregates candidates across the whole page and settles
// one of four terminal classifications. One analyzer instance per page view;
// results are cached keyed by the snapshot fingerprint.
// ============================================================================

/// Path-scoped analyzer overrides, separate from the site policy: these
/// change the page verdict, not whether the domain may be considered.
#[derive(Debug, Clone)]
pub struct OverridePatterns {
    /// Force `primary_form` when (domain, path prefix) matches and a
    /// legitimate candidate exists — works even on excluded domains
    pub force_primary: Vec<(String, String)>,
    /// Relax `no_forms` to `has_forms` on matched prefixes
    pub include: Vec<(String, String)>,
}

impl Default for OverridePatterns {
    fn default() -> Self {
        Self {
            force_primary: vec![
                ("twitter.com".into(), "/i/flow/login".into()),
                ("twitter.com".into(), "/login".into()),
                ("x.com".into(), "/i/flow/login".into()),
                ("docs.google.com".into(), "/forms".into()),
                ("linkedin.com".into(), "/login".into()),
            ],
            include: Vec::new(),
        }
    }
}

impl OverridePatterns {
    fn matches(patterns: &[(String, String)], host: &str, path: &str) -> bool {
        patterns.iter().any(|(domain, prefix)| {
            (host == domain || host.ends_with(&format!(".{}", domain)))
                && path.starts_with(prefix.as_str())
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// A legitimate candidate with at least this many fields makes the page
    /// a primary-form page
    pub primary_field_threshold: usize,
    /// Minimum interactive controls for an implicit cluster
    pub implicit_cluster_min: usize,
    pub extractor: ExtractorOptions,
    pub overrides: OverridePatterns,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            primary_field_threshold: 5,
            implicit_cluster_min: 3,
            extractor: ExtractorOptions::default(),
            overrides: OverridePatterns::default(),
        }
    }
}

pub struct PageAnalyzer {
    scorer: Box<dyn Scorer>,
    classifier: Box<dyn Classifier>,
    config: AnalyzerConfig,
    cache: Option<PageAnalysis>,
}

impl PageAnalyzer {
    pub fn new(
        scorer: Box<dyn Scorer>,
        classifier: Box<dyn Classifier>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            scorer,
            classifier,
            config,
            cache: None,
        }
    }

    /// Analyze the page, reusing the cached result when the snapshot is
    /// unchanged. The returned analysis is owned by the analyzer's cache.
    pub fn analyze(&mut self, doc: &DocumentSnapshot, policy: &dyn PolicyStore) -> &PageAnalysis {
        let fingerprint = doc.fingerprint();
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|c| c.fingerprint != fingerprint);
        if stale {
            self.cache = Some(self.analyze_uncached(doc, policy, fingerprint));
        }
        self.cache.as_ref().unwrap()
    }

    /// Structural-change hook: re-analysis only happens while the last
    /// verdict was `no_forms`; once the page has settled forms the cache is
    /// kept to avoid UI churn.
    pub fn notice_structural_change(
        &mut self,
        doc: &DocumentSnapshot,
        policy: &dyn PolicyStore,
    ) -> Option<&PageAnalysis> {
        match &self.cache {
            Some(c) if c.page_type != PageClassification::NoForms => None,
            _ => {
                self.cache = None;
                Some(self.analyze(doc, policy))
            }
        }
    }

    pub fn cached(&self) -> Option<&PageAnalysis> {
        self.cache.as_ref()
    }

    fn analyze_uncached(
        &self,
        doc: &DocumentSnapshot,
        policy: &dyn PolicyStore,
        fingerprint: String,
    ) -> PageAnalysis {
        let context = PageContext::from_snapshot(doc);
        let forced_primary = OverridePatterns::matches(
            &self.config.overrides.force_primary,
            &context.host,
            &context.path,
        );

        // Fast pre-checks: domain policy, then document-editor shape. A
        // force-primary pattern keeps an otherwise-excluded domain in play.
        let decision = policy.evaluate(&context.host, &context.path);
        if !decision.allowed && !forced_primary {
            return PageAnalysis {
                page_type: PageClassification::Excluded,
                reason: decision.reason,
                context,
                candidates: Vec::new(),
                fingerprint,
            };
        }
        if let Some(editor) = detect_document_editor(doc, &context) {
            if !forced_primary {
                return PageAnalysis {
                    page_type: PageClassification::Excluded,
                    reason: format!("document editor: {}", editor.detail),
                    context,
                    candidates: Vec::new(),
                    fingerprint,
                };
            }
        }

        let candidates = self.collect_candidates(doc, &context);
        let total_fields: usize = candidates.iter().map(|c| c.candidate.fields.len()).sum();
        let legit_count = candidates.iter().filter(|c| c.is_legitimate()).count();
        let best_legit_fields = candidates
            .iter()
            .filter(|c| c.is_legitimate())
            .map(|c| c.candidate.fields.len())
            .max()
            .unwrap_or(0);

        let (page_type, reason) = if forced_primary && legit_count > 0 {
            (
                PageClassification::PrimaryForm,
                "site override: force-primary path pattern".to_string(),
            )
        } else if policy.is_form_host(&context.host) {
            (
                PageClassification::PrimaryForm,
                format!("dedicated form host '{}'", context.host),
            )
        } else if legit_count > 0
            && (best_legit_fields >= self.config.primary_field_threshold
                || (total_fields > 0
                    && best_legit_fields * 10 >= total_fields * 6
                    && best_legit_fields >= 3))
        {
            (
                PageClassification::PrimaryForm,
                format!("dominant legitimate form ({} fields)", best_legit_fields),
            )
        } else if legit_count > 0 {
            (
                PageClassification::HasForms,
                format!("{} legitimate form(s) below primary threshold", legit_count),
            )
        } else if OverridePatterns::matches(
            &self.config.overrides.include,
            &context.host,
            &context.path,
        ) {
            (
                PageClassification::HasForms,
                "site override: include path pattern".to_string(),
            )
        } else {
            (
                PageClassification::NoForms,
                "no legitimate candidates".to_string(),
            )
        };

        PageAnalysis {
            page_type,
            reason,
            context,
            candidates,
            fingerprint,
        }
    }

    fn collect_candidates(
        &self,
        doc: &DocumentSnapshot,
        context: &PageContext,
    ) -> Vec<CandidateAnalysis> {
        let mut containers: Vec<(usize, CandidateSource)> = Vec::new();
        for idx in doc.indices() {
            let node = doc.node(idx);
            if node.tag == "form" || node.role() == Some("form") {
                containers.push((idx, CandidateSource::Explicit));
            }
        }
        let explicit: Vec<usize> = containers.iter().map(|(i, _)| *i).collect();
        for idx in implicit_clusters(doc, &explicit, self.config.implicit_cluster_min) {
            containers.push((idx, CandidateSource::Implicit));
        }

        containers
            .into_iter()
            .map(|(idx, source)| {
                let candidate = build_candidate(doc, idx, source, self.config.extractor);
                let classification = self.classifier.classify(&candidate, context);
                let exclusion = run_filters(&candidate, context);
                let verdict =
                    self.scorer
                        .evaluate(&candidate, context, &classification, exclusion.clone());
                CandidateAnalysis {
                    candidate,
                    exclusion,
                    classification,
                    verdict,
                }
            })
            .collect()
    }
}

// ============================================================================
// Implicit clusters — groups of interactive controls outside any explicit
// container, sharing a common ancestor that also holds a submit-like
// affordance. The deepest qualifying ancestor wins.
// ============================================================================

fn implicit_clusters(doc: &DocumentSnapshot, explicit: &[usize], min: usize) -> Vec<usize> {
    let mut inside_explicit = vec![false; doc.len()];
    for &e in explicit {
        for i in doc.subtree(e) {
            inside_explicit[i] = true;
        }
    }

    let mut qualifying = Vec::new();
    for idx in doc.indices() {
        if inside_explicit[idx] {
            continue;
        }
        let subtree = doc.subtree(idx);
        let interactive = subtree
            .iter()
            .filter(|&&i| !inside_explicit[i] && is_interactive_control(doc.node(i)))
            .count();
        if interactive < min {
            continue;
        }
        let has_submit_like = subtree.iter().any(|&i| {
            let n = doc.node(i);
            if inside_explicit[i] {
                return false;
            }
            n.input_type().as_deref() == Some("submit")
                || (n.tag == "button" && !matched_action_words(&doc.text_content(i)).is_empty())
                || (n.role() == Some("button")
                    && !matched_action_words(&doc.text_content(i)).is_empty())
        });
        if has_submit_like {
            qualifying.push(idx);
        }
    }

    // Keep only the deepest qualifying ancestors
    qualifying
        .iter()
        .copied()
        .filter(|&q| {
            !qualifying
                .iter()
                .any(|&other| other != q && doc.is_within(other, q))
        })
        .collect()
}
