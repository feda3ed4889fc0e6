use crate::exclusion::detectors::ExclusionMatch;
use crate::field::field_model::{FieldKind, FormCandidate};
use crate::page::page_model::PageContext;
use crate::scoring::score_model::{
    LegitimacyVerdict, ReasonCode, STRICT_MIN_SIGNIFICANT_FIELDS, STRICT_NO_SUBMIT_PENALTY,
    ScoreBreakdown, ScoringConfig,
};
use crate::semantic::classifier::ClassificationResult;

// ============================================================================
// Legitimacy scoring — eleven independent factors, each 0..=100, combined by
// fixed weights and capped at 100. Every factor is a pure function of the
// candidate and page context; nothing reads the document directly.
//
// Strict mode is a separate second phase applied after the weighted sum
// (structural floor, missing-submit penalty). The two phases are calibrated
// together; do not fold the penalties into the weights.
// ============================================================================

pub trait Scorer {
    fn evaluate(
        &self,
        candidate: &FormCandidate,
        page: &PageContext,
        classification: &ClassificationResult,
        exclusion: Option<ExclusionMatch>,
    ) -> LegitimacyVerdict;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedScorer {
    pub config: ScoringConfig,
}

impl WeightedScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }
}

/// No-op scorer: never legitimate. Selected by configuration when scoring is
/// disabled; the activation gate then falls back to its permissive default.
#[derive(Debug, Default)]
pub struct NoopScorer;

impl Scorer for NoopScorer {
    fn evaluate(
        &self,
        _candidate: &FormCandidate,
        _page: &PageContext,
        _classification: &ClassificationResult,
        exclusion: Option<ExclusionMatch>,
    ) -> LegitimacyVerdict {
        LegitimacyVerdict {
            legitimate: false,
            score: 0.0,
            breakdown: ScoreBreakdown::from_raw(Vec::new()),
            reason_code: ReasonCode::BelowThreshold,
            exclusion,
        }
    }
}

// ============================================================================
// Factors
// ============================================================================

/// Presence of the structural skeleton a real form has: fields, a way to
/// submit, and an identifiable container.
fn required_structural_elements(c: &FormCandidate) -> f32 {
    let mut raw = 0.0;
    if !c.fields.is_empty() {
        raw += 50.0;
    }
    if c.submit.present() {
        raw += 30.0;
    }
    if c.is_form_element || !c.identifier.is_empty() {
        raw += 20.0;
    }
    raw
}

/// Focused forms carry a handful of fields; over-large containers are
/// penalized because they usually wrap a whole page, not one form.
fn field_count(c: &FormCandidate) -> f32 {
    match c.fields.len() {
        0 => 0.0,
        1 => 30.0,
        2 => 60.0,
        3..=4 => 85.0,
        5..=30 => 100.0,
        _ => 60.0,
    }
}

fn submit_affordance(c: &FormCandidate) -> f32 {
    let s = &c.submit;
    let wording = !s.action_words.is_empty();
    if s.explicit_submit && wording {
        100.0
    } else if s.explicit_submit {
        90.0
    } else if s.wording_on_clickable {
        85.0
    } else if s.has_submit_handler {
        80.0
    } else if s.has_action_url {
        65.0
    } else {
        20.0
    }
}

/// Label coverage, with placeholder-only labels counted at half weight.
fn label_association(c: &FormCandidate) -> f32 {
    if c.fields.is_empty() {
        return 20.0;
    }
    let credit: f32 = c
        .fields
        .iter()
        .map(|f| {
            if f.has_real_label() {
                1.0
            } else if f.has_placeholder_label() {
                0.5
            } else {
                0.0
            }
        })
        .sum();
    let coverage = credit / c.fields.len() as f32;
    if coverage >= 0.8 {
        100.0
    } else if coverage >= 0.6 {
        80.0
    } else if coverage >= 0.4 {
        60.0
    } else if coverage >= 0.2 {
        40.0
    } else {
        20.0
    }
}

fn field_type_diversity(c: &FormCandidate) -> f32 {
    let kinds: std::collections::HashSet<FieldKind> =
        c.fields.iter().map(|f| f.kind).collect();
    match kinds.len() {
        0 => 0.0,
        1 => 30.0,
        2 => 60.0,
        3 => 80.0,
        _ => 100.0,
    }
}

fn form_level_attributes(c: &FormCandidate) -> f32 {
    let mut raw: f32 = 0.0;
    if !c.identifier.is_empty() {
        raw += 40.0;
    }
    if c.action.as_deref().is_some_and(|a| !a.trim().is_empty()) {
        raw += 30.0;
    }
    const FORMISH: &[&str] = &["form", "login", "signup", "register", "checkout", "contact"];
    if c.class_tokens
        .iter()
        .any(|t| FORMISH.iter().any(|f| t.contains(f)))
    {
        raw += 30.0;
    }
    raw.min(100.0)
}

/// Delegates to the semantic classifier's best-archetype match, reused from
/// the classification already computed this pass.
fn semantic_match(classification: &ClassificationResult) -> f32 {
    classification.match_ratio * 100.0
}

fn validation_presence(c: &FormCandidate) -> f32 {
    if c.fields.is_empty() {
        return 20.0;
    }
    let validated = c
        .fields
        .iter()
        .filter(|f| f.required || !f.validation.is_empty())
        .count();
    let ratio = validated as f32 / c.fields.len() as f32;
    if ratio >= 0.5 {
        100.0
    } else if ratio >= 0.25 {
        70.0
    } else if ratio > 0.0 {
        50.0
    } else {
        20.0
    }
}

fn structured_layout(c: &FormCandidate) -> f32 {
    let mut raw = 0.0;
    if c.has_fieldset {
        raw += 40.0;
    }
    let labeled = c.fields.iter().filter(|f| f.has_real_label()).count();
    if !c.fields.is_empty() && labeled * 10 >= c.fields.len() * 6 {
        raw += 30.0;
    }
    if (2..=30).contains(&c.fields.len()) {
        raw += 30.0;
    }
    raw
}

fn secure_context(c: &FormCandidate, page: &PageContext) -> f32 {
    let mut raw: f32 = 0.0;
    if page.secure {
        raw += 40.0;
    }
    if c.has_kind(FieldKind::Password) {
        raw += 30.0;
    }
    const SECURITY_COPY: &[&str] = &["secure", "ssl", "encrypted", "privacy"];
    if c.has_token_field
        || SECURITY_COPY
            .iter()
            .any(|t| c.surrounding_text.contains(t))
    {
        raw += 20.0;
    }
    raw.min(100.0)
}

/// Whether the page itself looks like a place forms live. Neutral (50) when
/// nothing points either way.
fn page_context(page: &PageContext) -> f32 {
    const PAGE_TOKENS: &[&str] = &[
        "login", "register", "signup", "sign-up", "checkout", "contact", "apply",
        "application", "form", "account",
    ];
    let url = page.url.to_lowercase();
    let title = page.title.to_lowercase();
    if PAGE_TOKENS.iter().any(|t| url.contains(t)) {
        100.0
    } else if PAGE_TOKENS.iter().any(|t| title.contains(t)) {
        70.0
    } else {
        50.0
    }
}

// ============================================================================
// Combination
// ============================================================================

pub fn compute_breakdown(
    c: &FormCandidate,
    page: &PageContext,
    classification: &ClassificationResult,
) -> ScoreBreakdown {
    ScoreBreakdown::from_raw(vec![
        ("required_structural_elements", required_structural_elements(c)),
        ("field_count", field_count(c)),
        ("submit_affordance", submit_affordance(c)),
        ("label_association", label_association(c)),
        ("field_type_diversity", field_type_diversity(c)),
        ("form_level_attributes", form_level_attributes(c)),
        ("semantic_match", semantic_match(classification)),
        ("validation_presence", validation_presence(c)),
        ("structured_layout", structured_layout(c)),
        ("secure_context", secure_context(c, page)),
        ("page_context", page_context(page)),
    ])
}

impl Scorer for WeightedScorer {
    fn evaluate(
        &self,
        candidate: &FormCandidate,
        page: &PageContext,
        classification: &ClassificationResult,
        exclusion: Option<ExclusionMatch>,
    ) -> LegitimacyVerdict {
        let breakdown = compute_breakdown(candidate, page, classification);
        let mut score = breakdown.total;
        let mut reason_code = ReasonCode::Ok;
        let mut legitimate = true;

        // Phase two: strict-mode post-adjustments, applied after the weighted
        // sum on purpose (see module header).
        if self.config.strict {
            if candidate.significant_field_count() < STRICT_MIN_SIGNIFICANT_FIELDS {
                legitimate = false;
                reason_code = ReasonCode::StrictFieldCount;
            }
            if !candidate.submit.explicit_submit {
                score = (score - STRICT_NO_SUBMIT_PENALTY).max(0.0);
            }
        }

        if legitimate && score < self.config.threshold {
            legitimate = false;
            reason_code = ReasonCode::BelowThreshold;
        }

        // Exclusion dominates everything, including a perfect score
        if exclusion.is_some() {
            legitimate = false;
            reason_code = ReasonCode::Excluded;
        }

        LegitimacyVerdict {
            legitimate,
            score,
            breakdown,
            reason_code,
            exclusion,
        }
    }
}
