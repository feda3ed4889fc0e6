use serde::Serialize;

use crate::field::field_model::FormCandidate;
use crate::page::page_model::PageContext;
use crate::semantic::archetypes::{ARCHETYPES, Archetype};

// ============================================================================
// Semantic classification — labels a candidate with its best-guess purpose
// by matching it against the declarative archetype table.
// ============================================================================

/// Minimum fraction of an archetype's attainable score needed to accept it.
pub const MIN_ACCEPT_RATIO: f32 = 0.4;
/// Confidence never reaches certainty, however many sources agree.
pub const CONFIDENCE_CAP: f32 = 0.95;

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// Archetype name, or "unknown" below the acceptance floor
    pub form_type: String,
    pub purpose: String,
    pub confidence: f32,
    /// Ordered human-readable justifications
    pub reasoning: Vec<String>,
    /// Identifiers of fields that matched archetype tokens
    pub matched_fields: Vec<String>,
    /// Normalized best-archetype match ratio (0 when unknown); the
    /// legitimacy scorer reuses this as its semantic-match factor
    pub match_ratio: f32,
}

impl ClassificationResult {
    pub fn unknown() -> Self {
        Self {
            form_type: "unknown".to_string(),
            purpose: String::new(),
            confidence: 0.0,
            reasoning: vec!["no archetype reached the acceptance floor".to_string()],
            matched_fields: Vec::new(),
            match_ratio: 0.0,
        }
    }

    pub fn is_known(&self) -> bool {
        self.form_type != "unknown"
    }
}

pub trait Classifier {
    fn classify(&self, candidate: &FormCandidate, page: &PageContext) -> ClassificationResult;
}

/// Default classifier backed by the archetype table.
#[derive(Debug, Default)]
pub struct ArchetypeClassifier;

/// No-op classifier: everything is unknown. Selected by configuration when
/// classification is disabled; keeps the pipeline total instead of
/// feature-detecting a missing collaborator at runtime.
#[derive(Debug, Default)]
pub struct NoopClassifier;

impl Classifier for NoopClassifier {
    fn classify(&self, _candidate: &FormCandidate, _page: &PageContext) -> ClassificationResult {
        ClassificationResult::unknown()
    }
}

// ============================================================================
// Matching internals
// ============================================================================

struct ArchetypeMatch<'a> {
    archetype: &'a Archetype,
    normalized: f32,
    keyword_hits: Vec<&'static str>,
    attr_keyword_hit: bool,
    page_keyword_hit: bool,
    required_ratio: f32,
    common_ratio: f32,
    action_hit: bool,
    matched_fields: Vec<String>,
}

fn token_ratio(
    tokens: &[&'static str],
    candidate: &FormCandidate,
    matched_fields: &mut Vec<String>,
) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    for token in tokens {
        let hit = candidate
            .fields
            .iter()
            .find(|f| f.token_blob().contains(token));
        if let Some(f) = hit {
            hits += 1;
            let label = if f.identifier.is_empty() {
                f.label_text.clone()
            } else {
                f.identifier.clone()
            };
            if !matched_fields.contains(&label) {
                matched_fields.push(label);
            }
        }
    }
    hits as f32 / tokens.len() as f32
}

fn score_archetype<'a>(
    archetype: &'a Archetype,
    candidate: &FormCandidate,
    page: &PageContext,
) -> ArchetypeMatch<'a> {
    let attr_blob = candidate.attr_blob();
    let page_blob = page.text_blob();

    let mut keyword_hits = Vec::new();
    let mut attr_keyword_hit = false;
    let mut page_keyword_hit = false;
    for kw in archetype.keywords {
        let in_attrs = attr_blob.contains(kw);
        let in_page = page_blob.contains(kw);
        if in_attrs || in_page {
            keyword_hits.push(*kw);
        }
        attr_keyword_hit |= in_attrs;
        page_keyword_hit |= in_page;
    }
    let keyword_ratio = if archetype.keywords.is_empty() {
        0.0
    } else {
        keyword_hits.len() as f32 / archetype.keywords.len() as f32
    };

    let mut matched_fields = Vec::new();
    let required_ratio = token_ratio(archetype.required_fields, candidate, &mut matched_fields);
    let common_ratio = token_ratio(archetype.common_fields, candidate, &mut matched_fields);

    let wording = candidate.submit.action_words.join(" ");
    let action_hit = archetype.submit_words.iter().any(|w| wording.contains(w));

    let required_part = if archetype.required_fields.is_empty() {
        0.2
    } else {
        0.3 * required_ratio
    };
    let score = 0.4 * keyword_ratio
        + required_part
        + 0.3 * common_ratio
        + if action_hit { 0.2 } else { 0.0 };

    let max_attainable = 0.4
        + if archetype.required_fields.is_empty() { 0.2 } else { 0.3 }
        + 0.3
        + 0.2;

    ArchetypeMatch {
        archetype,
        normalized: (score / max_attainable).clamp(0.0, 1.0),
        keyword_hits,
        attr_keyword_hit,
        page_keyword_hit,
        required_ratio,
        common_ratio,
        action_hit,
        matched_fields,
    }
}

impl Classifier for ArchetypeClassifier {
    fn classify(&self, candidate: &FormCandidate, page: &PageContext) -> ClassificationResult {
        let mut best: Option<ArchetypeMatch> = None;
        for archetype in ARCHETYPES {
            let m = score_archetype(archetype, candidate, page);
            // Strictly-higher wins, so ties keep the first-declared archetype
            match &best {
                Some(b) if m.normalized <= b.normalized => {}
                _ => best = Some(m),
            }
        }

        let best = match best {
            Some(b) if b.normalized >= MIN_ACCEPT_RATIO => b,
            _ => return ClassificationResult::unknown(),
        };

        let mut reasoning = Vec::new();
        if !best.keyword_hits.is_empty() {
            reasoning.push(format!(
                "keywords matched: {}",
                best.keyword_hits.join(", ")
            ));
        }
        if best.required_ratio > 0.0 {
            reasoning.push(format!(
                "defining fields matched ({:.0}%)",
                best.required_ratio * 100.0
            ));
        }
        if best.common_ratio > 0.0 {
            reasoning.push(format!(
                "common fields matched ({:.0}%)",
                best.common_ratio * 100.0
            ));
        }
        if best.action_hit {
            reasoning.push("submit wording matched".to_string());
        }

        // Independent detection sources: container attributes, page url/title,
        // field structure. Agreement across them nudges confidence upward.
        let field_hit = best.required_ratio > 0.0 || best.common_ratio >= 0.5;
        let sources = [best.attr_keyword_hit, best.page_keyword_hit, field_hit]
            .iter()
            .filter(|s| **s)
            .count();

        let mut confidence =
            best.archetype.base_confidence * (best.normalized + 0.4).min(1.0);
        if sources > 1 {
            confidence += 0.05 * (sources - 1) as f32;
            reasoning.push(format!("{} independent sources agree", sources));
        }
        confidence = confidence.min(CONFIDENCE_CAP);

        ClassificationResult {
            form_type: best.archetype.name.to_string(),
            purpose: best.archetype.purpose.to_string(),
            confidence,
            reasoning,
            matched_fields: best.matched_fields,
            match_ratio: best.normalized,
        }
    }
}
