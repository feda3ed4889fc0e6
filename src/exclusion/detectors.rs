use serde::Serialize;

use crate::dom::dom_model::DocumentSnapshot;
use crate::field::field_model::{FieldKind, FormCandidate};
use crate::page::page_model::PageContext;

// ============================================================================
// Exclusion filter — independent detectors for non-form UI shapes.
// A match short-circuits the candidate to "not legitimate" before scoring.
// Detectors hold no state and are cheaply re-evaluable every pass.
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionMatch {
    /// Stable detector name ("search", "newsletter", "comment", "chat",
    /// "document_editor")
    pub reason: String,
    pub detail: String,
}

impl ExclusionMatch {
    fn new(reason: &str, detail: impl Into<String>) -> Self {
        Self {
            reason: reason.to_string(),
            detail: detail.into(),
        }
    }
}

/// Run the per-candidate detectors in declaration order; first match wins.
pub fn run_filters(candidate: &FormCandidate, page: &PageContext) -> Option<ExclusionMatch> {
    detect_search(candidate)
        .or_else(|| detect_newsletter(candidate))
        .or_else(|| detect_comment(candidate, page))
        .or_else(|| detect_chat(candidate, page))
}

// ============================================================================
// Search forms
// ============================================================================

const SEARCH_TOKENS: &[&str] = &["search", "query", "suche", "buscar", "find"];

fn contains_any(haystack: &str, tokens: &[&'static str]) -> Option<&'static str> {
    let lower = haystack.to_lowercase();
    tokens.iter().find(|t| lower.contains(**t)).copied()
}

pub fn detect_search(candidate: &FormCandidate) -> Option<ExclusionMatch> {
    if candidate.role.as_deref() == Some("search") {
        return Some(ExclusionMatch::new("search", "container role=search"));
    }
    if candidate.has_search_typed_field {
        return Some(ExclusionMatch::new("search", "search-typed input present"));
    }
    if let Some(token) = contains_any(&candidate.attr_blob(), SEARCH_TOKENS) {
        return Some(ExclusionMatch::new(
            "search",
            format!("container attributes mention '{}'", token),
        ));
    }
    // Shape: exactly one text field + at least one clickable, where the
    // field's own name or placeholder is search-flavored
    let text_fields: Vec<_> = candidate
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::Text)
        .collect();
    if candidate.fields.len() == 1
        && text_fields.len() == 1
        && candidate.submit.present()
        && (contains_any(&text_fields[0].token_blob(), SEARCH_TOKENS).is_some()
            || text_fields[0].identifier == "q")
    {
        return Some(ExclusionMatch::new(
            "search",
            "single text field with search-flavored name",
        ));
    }
    None
}

// ============================================================================
// Newsletter signups
// ============================================================================

const NEWSLETTER_TOKENS: &[&str] = &["newsletter", "subscribe", "mailing-list", "mailing_list"];
const NEWSLETTER_COPY: &[&str] = &["newsletter", "subscribe", "updates", "mailing list"];

pub fn detect_newsletter(candidate: &FormCandidate) -> Option<ExclusionMatch> {
    if let Some(token) = contains_any(&candidate.attr_blob(), NEWSLETTER_TOKENS) {
        return Some(ExclusionMatch::new(
            "newsletter",
            format!("container attributes mention '{}'", token),
        ));
    }
    // Exactly one field and it's an email (by type or by name)
    if candidate.fields.len() == 1 {
        let only = &candidate.fields[0];
        if only.kind == FieldKind::Email || only.token_blob().contains("email") {
            return Some(ExclusionMatch::new(
                "newsletter",
                "single email field",
            ));
        }
    }
    // Tiny form surrounded by newsletter copy
    if candidate.fields.len() <= 2
        && contains_any(&candidate.surrounding_text, NEWSLETTER_COPY).is_some()
    {
        return Some(ExclusionMatch::new(
            "newsletter",
            "<=2 fields with newsletter copy nearby",
        ));
    }
    None
}

// ============================================================================
// Comment boxes
// ============================================================================

const COMMENT_TOKENS: &[&str] = &["comment", "reply", "respond"];
const COMMENT_URL_TOKENS: &[&str] = &["#comment", "comment-page", "/respond", "#respond"];

pub fn detect_comment(candidate: &FormCandidate, page: &PageContext) -> Option<ExclusionMatch> {
    // Id/class only: an action url may mention comments without the
    // container being a comment box
    if contains_any(&candidate.naming_blob(), &["comment"]).is_some() {
        return Some(ExclusionMatch::new(
            "comment",
            "container id/class mentions 'comment'",
        ));
    }
    let textareas: Vec<_> = candidate
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::Textarea)
        .collect();
    // Shape: one textarea plus at most one other field, textarea named
    // comment/reply
    if textareas.len() == 1
        && candidate.fields.len() <= 2
        && contains_any(&textareas[0].token_blob(), COMMENT_TOKENS).is_some()
    {
        return Some(ExclusionMatch::new(
            "comment",
            "single comment/reply textarea",
        ));
    }
    // Comment permalink url plus any textarea
    if !textareas.is_empty()
        && COMMENT_URL_TOKENS
            .iter()
            .any(|t| page.url.to_lowercase().contains(t))
    {
        return Some(ExclusionMatch::new(
            "comment",
            "comment permalink url with textarea",
        ));
    }
    None
}

// ============================================================================
// Chat composers
// ============================================================================

const CHAT_TOKENS: &[&str] = &["chat", "message"];

pub fn detect_chat(candidate: &FormCandidate, page: &PageContext) -> Option<ExclusionMatch> {
    // Id/class only: contact forms routinely post to "/send-message"
    if let Some(token) = contains_any(&candidate.naming_blob(), CHAT_TOKENS) {
        return Some(ExclusionMatch::new(
            "chat",
            format!("container id/class mentions '{}'", token),
        ));
    }
    // Single composer field with a send/chat button
    if candidate.fields.len() == 1
        && matches!(
            candidate.fields[0].kind,
            FieldKind::Text | FieldKind::Textarea
        )
    {
        let wording = candidate.submit.action_words.join(" ");
        if wording.contains("send") || wording.contains("chat") {
            return Some(ExclusionMatch::new(
                "chat",
                "single composer field with send button",
            ));
        }
    }
    // Next to a page-level message list
    if page.has_message_list && candidate.fields.len() <= 2 {
        return Some(ExclusionMatch::new(
            "chat",
            "<=2 fields near a message list",
        ));
    }
    None
}

// ============================================================================
// Document-editor pages (page-level, not per-candidate)
// ============================================================================

const EDITOR_DOMAINS: &[&str] = &[
    "docs.google.com",
    "office.com",
    "office.live.com",
    "onedrive.live.com",
    "notion.so",
    "paper.dropbox.com",
    "figma.com",
    "canva.com",
    "overleaf.com",
];

const EDITOR_CLASS_TOKENS: &[&str] = &["editor", "docs-", "writer", "kix-"];
const LARGE_EDITABLE_TEXT_LEN: usize = 400;

/// A document-editor page never hosts assistable forms; two of three
/// structural signals (or a known editor domain) exclude the whole page.
pub fn detect_document_editor(
    doc: &DocumentSnapshot,
    page: &PageContext,
) -> Option<ExclusionMatch> {
    if EDITOR_DOMAINS
        .iter()
        .any(|d| page.host == *d || page.host.ends_with(&format!(".{}", d)))
    {
        return Some(ExclusionMatch::new(
            "document_editor",
            format!("known editor domain '{}'", page.host),
        ));
    }

    let mut signals = 0usize;
    let mut seen = Vec::new();

    // Editor toolbar
    if doc.indices().any(|i| {
        let n = doc.node(i);
        n.role() == Some("toolbar")
            || (n.id_class_blob().contains("toolbar") && n.id_class_blob().contains("edit"))
    }) {
        signals += 1;
        seen.push("toolbar");
    }

    // Editor-named class on html/body
    if doc.indices().any(|i| {
        let n = doc.node(i);
        matches!(n.tag.as_str(), "html" | "body")
            && EDITOR_CLASS_TOKENS
                .iter()
                .any(|t| n.id_class_blob().contains(t))
    }) {
        signals += 1;
        seen.push("editor class on html/body");
    }

    // Large content-editable region
    if doc.indices().any(|i| {
        let n = doc.node(i);
        n.attr("contenteditable") == Some("true")
            && doc.text_content(i).len() >= LARGE_EDITABLE_TEXT_LEN
    }) {
        signals += 1;
        seen.push("large contenteditable region");
    }

    if signals >= 2 {
        return Some(ExclusionMatch::new(
            "document_editor",
            format!("editor signals: {}", seen.join(", ")),
        ));
    }
    None
}
