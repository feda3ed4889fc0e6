use std::collections::HashSet;

use crate::dom::dom_model::{DocumentSnapshot, DomNode};
use crate::field::field_model::{
    CandidateSource, FieldDescriptor, FieldKind, FieldOption, FormCandidate, LabelSource,
    SubmitAffordance, ValidationRules,
};

/// Wording that marks a clickable as a submit affordance.
pub const ACTION_WORDS: &[&str] = &[
    "submit", "send", "continue", "pay", "log in", "login", "sign in", "sign up", "signup",
    "register", "create account", "checkout", "place order", "order", "apply", "save",
    "confirm", "subscribe", "join", "upload", "next", "get started", "donate", "book",
    "reset password",
];

#[derive(Debug, Clone, Copy)]
pub struct ExtractorOptions {
    pub include_hidden: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self { include_hidden: false }
    }
}

// ============================================================================
// Control discovery
// ============================================================================

pub fn is_interactive_control(node: &DomNode) -> bool {
    match node.tag.as_str() {
        "select" | "textarea" => true,
        "input" => !matches!(
            node.input_type().as_deref(),
            Some("submit") | Some("button") | Some("reset") | Some("image")
        ),
        _ => false,
    }
}

pub fn field_kind(node: &DomNode) -> FieldKind {
    match node.tag.as_str() {
        "select" => FieldKind::Select,
        "textarea" => FieldKind::Textarea,
        "input" => match node.input_type().as_deref() {
            None | Some("text") | Some("search") | Some("url") => FieldKind::Text,
            Some("email") => FieldKind::Email,
            Some("password") => FieldKind::Password,
            Some("tel") => FieldKind::Tel,
            Some("number") | Some("range") => FieldKind::Number,
            Some("date") | Some("datetime-local") | Some("month") | Some("week")
            | Some("time") => FieldKind::Date,
            Some("checkbox") => FieldKind::Checkbox,
            Some("radio") => FieldKind::Radio,
            Some("file") => FieldKind::File,
            Some("hidden") => FieldKind::Hidden,
            _ => FieldKind::Other,
        },
        _ => FieldKind::Other,
    }
}

// ============================================================================
// Label resolution — fixed priority order, must not be reordered:
// explicit for-association, wrapping label, aria-label, aria-labelledby,
// placeholder (weak).
// ============================================================================

pub fn resolve_label(doc: &DocumentSnapshot, field_idx: usize) -> (String, LabelSource) {
    let node = doc.node(field_idx);

    // (1) explicit <label for=...>
    if let Some(id) = node.id() {
        for i in doc.find_by_tag("label") {
            if doc.node(i).attr("for") == Some(id) {
                let text = doc.text_content(i);
                if !text.is_empty() {
                    return (text, LabelSource::Explicit);
                }
            }
        }
    }

    // (2) wrapping label
    for a in doc.ancestors(field_idx) {
        if doc.node(a).tag == "label" {
            let text = doc.text_content(a);
            if !text.is_empty() {
                return (text, LabelSource::Wrapping);
            }
        }
    }

    // (3) aria-label
    if let Some(label) = node.attr("aria-label") {
        let label = label.trim();
        if !label.is_empty() {
            return (label.to_string(), LabelSource::AriaLabel);
        }
    }

    // (4) aria-labelledby target text
    if let Some(refs) = node.attr("aria-labelledby") {
        let mut parts = Vec::new();
        for token in refs.split_whitespace() {
            if let Some(target) = doc.by_id(token) {
                let text = doc.text_content(target);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        if !parts.is_empty() {
            return (parts.join(" "), LabelSource::AriaLabelledBy);
        }
    }

    // (5) placeholder (weak label)
    if let Some(placeholder) = node.attr("placeholder") {
        let placeholder = placeholder.trim();
        if !placeholder.is_empty() {
            return (placeholder.to_string(), LabelSource::Placeholder);
        }
    }

    (String::new(), LabelSource::None)
}

// ============================================================================
// Field extraction
// ============================================================================

fn validation_of(node: &DomNode) -> ValidationRules {
    ValidationRules {
        pattern: node.attr("pattern").map(|s| s.to_string()),
        min: node.attr("min").map(|s| s.to_string()),
        max: node.attr("max").map(|s| s.to_string()),
        min_length: node.attr("minlength").and_then(|s| s.parse().ok()),
        max_length: node.attr("maxlength").and_then(|s| s.parse().ok()),
    }
}

fn is_required(node: &DomNode) -> bool {
    node.has_attr("required") || node.attr("aria-required") == Some("true")
}

fn select_options(doc: &DocumentSnapshot, select_idx: usize) -> Vec<FieldOption> {
    doc.subtree(select_idx)
        .into_iter()
        .filter(|&i| doc.node(i).tag == "option")
        .map(|i| {
            let node = doc.node(i);
            let text = doc.text_content(i);
            FieldOption {
                value: node.attr("value").unwrap_or(&text).to_string(),
                text,
                selected: node.has_attr("selected"),
            }
        })
        .collect()
}

/// Extract field descriptors for every interactive control under
/// `container_idx`. Radio and checkbox controls sharing a name collapse into
/// one descriptor carrying the group's options. Submit/button/reset/image
/// controls are never fields; hidden fields are skipped unless opted in.
/// Pure function of the snapshot; a malformed control is skipped, not fatal.
pub fn extract_fields(
    doc: &DocumentSnapshot,
    container_idx: usize,
    opts: ExtractorOptions,
) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    let mut grouped: HashSet<String> = HashSet::new();

    let subtree = doc.subtree(container_idx);
    for &idx in &subtree {
        let node = doc.node(idx);
        if !is_interactive_control(node) {
            continue;
        }
        let kind = field_kind(node);
        if kind == FieldKind::Hidden && !opts.include_hidden {
            continue;
        }

        // Collapse same-name radio/checkbox groups into one descriptor
        if matches!(kind, FieldKind::Radio | FieldKind::Checkbox) {
            if let Some(name) = node.name() {
                let group_key = format!("{:?}:{}", kind, name);
                if !grouped.insert(group_key) {
                    continue;
                }
                let options = group_options(doc, &subtree, kind, name);
                let (label_text, label_source) = resolve_label(doc, idx);
                fields.push(FieldDescriptor {
                    kind,
                    identifier: name.to_string(),
                    label_text,
                    label_source,
                    required: is_required(node),
                    validation: ValidationRules::default(),
                    options,
                });
                continue;
            }
        }

        let (label_text, label_source) = resolve_label(doc, idx);
        let options = if kind == FieldKind::Select {
            select_options(doc, idx)
        } else {
            Vec::new()
        };

        fields.push(FieldDescriptor {
            kind,
            identifier: node
                .name()
                .or(node.id())
                .unwrap_or_default()
                .to_string(),
            label_text,
            label_source,
            required: is_required(node),
            validation: validation_of(node),
            options,
        });
    }

    fields
}

fn group_options(
    doc: &DocumentSnapshot,
    subtree: &[usize],
    kind: FieldKind,
    name: &str,
) -> Vec<FieldOption> {
    subtree
        .iter()
        .filter(|&&i| {
            let n = doc.node(i);
            is_interactive_control(n) && field_kind(n) == kind && n.name() == Some(name)
        })
        .map(|&i| {
            let n = doc.node(i);
            FieldOption {
                value: n.attr("value").unwrap_or("on").to_string(),
                text: resolve_label(doc, i).0,
                selected: n.has_attr("checked"),
            }
        })
        .collect()
}

// ============================================================================
// Submit affordance detection
// ============================================================================

pub fn matched_action_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    ACTION_WORDS
        .iter()
        .filter(|w| lower.contains(*w))
        .map(|w| w.to_string())
        .collect()
}

fn clickable_text(doc: &DocumentSnapshot, idx: usize) -> String {
    let node = doc.node(idx);
    if node.tag == "input" {
        return node.attr("value").unwrap_or_default().to_string();
    }
    doc.text_content(idx)
}

fn detect_submit(doc: &DocumentSnapshot, container_idx: usize) -> SubmitAffordance {
    let container = doc.node(container_idx);
    let mut affordance = SubmitAffordance {
        has_submit_handler: container.has_attr("onsubmit"),
        has_action_url: container
            .attr("action")
            .is_some_and(|a| !a.trim().is_empty()),
        ..SubmitAffordance::default()
    };

    for idx in doc.subtree(container_idx) {
        let node = doc.node(idx);
        let is_button = node.tag == "button";
        let typed_submit = node.input_type().as_deref() == Some("submit");
        // A button without an explicit type submits its form
        let is_submit_control = typed_submit || (is_button && node.input_type().is_none());
        let is_clickable =
            is_button || node.role() == Some("button") || (node.tag == "input" && typed_submit);

        if !is_submit_control && !is_clickable {
            continue;
        }
        let words = matched_action_words(&clickable_text(doc, idx));
        if is_submit_control {
            affordance.explicit_submit = true;
        } else if !words.is_empty() {
            affordance.wording_on_clickable = true;
        }
        for w in words {
            if !affordance.action_words.contains(&w) {
                affordance.action_words.push(w);
            }
        }
    }

    affordance
}

// ============================================================================
// Candidate assembly
// ============================================================================

const SURROUNDING_TEXT_CAP: usize = 600;
const TOKEN_FIELD_NAMES: &[&str] = &["csrf", "token", "authenticity", "nonce", "_verification"];

/// Build one Form Candidate from a container node. Everything scoring and
/// classification will later look at is captured here, once per pass.
pub fn build_candidate(
    doc: &DocumentSnapshot,
    container_idx: usize,
    source: CandidateSource,
    opts: ExtractorOptions,
) -> FormCandidate {
    let container = doc.node(container_idx);
    let fields = extract_fields(doc, container_idx, opts);

    let has_token_field = doc.subtree(container_idx).into_iter().any(|i| {
        let n = doc.node(i);
        n.tag == "input"
            && n.input_type().as_deref() == Some("hidden")
            && TOKEN_FIELD_NAMES.iter().any(|t| {
                n.name().unwrap_or_default().to_lowercase().contains(t)
                    || n.id().unwrap_or_default().to_lowercase().contains(t)
            })
    });

    let has_search_typed_field = doc.subtree(container_idx).into_iter().any(|i| {
        let n = doc.node(i);
        n.tag == "input" && n.input_type().as_deref() == Some("search")
    });

    let has_fieldset = doc
        .subtree(container_idx)
        .into_iter()
        .any(|i| doc.node(i).tag == "fieldset");

    let mut surrounding = doc.text_content(container_idx).to_lowercase();
    if let Some(parent) = container.parent {
        // Headings and copy next to the container carry classification signal
        let parent_text = doc.text_content(parent).to_lowercase();
        if parent_text.len() > surrounding.len() {
            surrounding = parent_text;
        }
    }
    if surrounding.len() > SURROUNDING_TEXT_CAP {
        // The cap is a byte count; back off to a char boundary
        let mut cut = SURROUNDING_TEXT_CAP;
        while !surrounding.is_char_boundary(cut) {
            cut -= 1;
        }
        surrounding.truncate(cut);
    }

    FormCandidate {
        identifier: container
            .id()
            .or(container.name())
            .unwrap_or_default()
            .to_string(),
        class_tokens: container.classes(),
        role: container.role().map(|s| s.to_string()),
        action: container.attr("action").map(|s| s.to_string()),
        target: container.attr("target").map(|s| s.to_string()),
        depth: doc.depth(container_idx),
        source,
        submit: detect_submit(doc, container_idx),
        fields,
        surrounding_text: surrounding,
        is_form_element: container.tag == "form",
        has_fieldset,
        has_token_field,
        has_search_typed_field,
    }
}
