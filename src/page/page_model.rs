use serde::Serialize;

use crate::dom::dom_model::DocumentSnapshot;
use crate::exclusion::detectors::ExclusionMatch;
use crate::field::field_model::FormCandidate;
use crate::scoring::score_model::LegitimacyVerdict;
use crate::semantic::classifier::ClassificationResult;

// ============================================================================
// Page context — page-level facts sampled once per pass so every later
// stage stays a pure function of its inputs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub url: String,
    pub host: String,
    pub path: String,
    pub title: String,
    pub secure: bool,
    /// A chat/message-list container exists somewhere on the page
    pub has_message_list: bool,
}

const MESSAGE_LIST_TOKENS: &[&str] = &["message-list", "messages", "chat-log", "chat-history"];

impl PageContext {
    pub fn from_snapshot(doc: &DocumentSnapshot) -> Self {
        let has_message_list = doc.indices().any(|i| {
            let node = doc.node(i);
            node.role() == Some("log")
                || MESSAGE_LIST_TOKENS
                    .iter()
                    .any(|t| node.id_class_blob().contains(t))
        });
        Self {
            url: doc.url.clone(),
            host: doc.host(),
            path: doc.path(),
            title: doc.title.clone(),
            secure: doc.is_secure(),
            has_message_list,
        }
    }

    /// Lowercased title + url, for keyword matching.
    pub fn text_blob(&self) -> String {
        format!("{} {}", self.title.to_lowercase(), self.url.to_lowercase())
    }
}

// ============================================================================
// Page classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageClassification {
    Excluded,
    PrimaryForm,
    HasForms,
    NoForms,
}

impl PageClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageClassification::Excluded => "excluded",
            PageClassification::PrimaryForm => "primary_form",
            PageClassification::HasForms => "has_forms",
            PageClassification::NoForms => "no_forms",
        }
    }
}

/// Everything the pipeline learned about one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAnalysis {
    pub candidate: FormCandidate,
    pub exclusion: Option<ExclusionMatch>,
    pub classification: ClassificationResult,
    pub verdict: LegitimacyVerdict,
}

impl CandidateAnalysis {
    pub fn is_legitimate(&self) -> bool {
        self.verdict.legitimate
    }
}

/// Result of one full page analysis. Owned by the pass that created it;
/// the analyzer caches it wholesale keyed by the snapshot fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct PageAnalysis {
    pub page_type: PageClassification,
    pub reason: String,
    pub context: PageContext,
    pub candidates: Vec<CandidateAnalysis>,
    pub fingerprint: String,
}

impl PageAnalysis {
    pub fn legitimate_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_legitimate()).count()
    }

    pub fn best_legitimate(&self) -> Option<&CandidateAnalysis> {
        self.candidates
            .iter()
            .filter(|c| c.is_legitimate())
            .max_by(|a, b| {
                a.verdict
                    .score
                    .partial_cmp(&b.verdict.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
