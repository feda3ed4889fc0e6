use serde_json::json;

use form_detection::field::extractor::{
    ExtractorOptions, build_candidate, extract_fields, matched_action_words, resolve_label,
};
use form_detection::field::field_model::{CandidateSource, FieldKind, LabelSource};

use crate::common::snapshots::{doc, input, label, login_page, submit_button};

mod common;

// =========================================================================
// Field extraction
// =========================================================================

#[test]
fn extracts_login_fields() {
    let page = login_page();
    let form = page.find_by_tag("form")[0];
    let fields = extract_fields(&page, form, ExtractorOptions::default());

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].kind, FieldKind::Email);
    assert_eq!(fields[0].identifier, "email");
    assert!(fields[0].required);
    assert_eq!(fields[0].label_source, LabelSource::Explicit);
    assert_eq!(fields[0].label_text, "Email address");
    assert_eq!(fields[1].kind, FieldKind::Password);
    assert!(fields[1].has_real_label());
}

#[test]
fn submit_controls_are_not_fields() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                { "tag": "input", "attrs": { "type": "submit", "value": "Go" } },
                { "tag": "input", "attrs": { "type": "button", "value": "Other" } },
                { "tag": "button", "text": "Click" }
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let fields = extract_fields(&page, form, ExtractorOptions::default());
    assert!(fields.is_empty());
}

#[test]
fn hidden_fields_skipped_unless_opted_in() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                { "tag": "input", "attrs": { "type": "hidden", "name": "tracking" } },
                input("text", "visible", false)
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];

    let default = extract_fields(&page, form, ExtractorOptions::default());
    assert_eq!(default.len(), 1);
    assert_eq!(default[0].identifier, "visible");

    let all = extract_fields(&page, form, ExtractorOptions { include_hidden: true });
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|f| f.kind == FieldKind::Hidden));
}

#[test]
fn radio_group_collapses_into_one_descriptor() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                { "tag": "input", "attrs": { "type": "radio", "name": "plan", "value": "free" } },
                { "tag": "input", "attrs": { "type": "radio", "name": "plan", "value": "pro", "checked": "" } },
                { "tag": "input", "attrs": { "type": "radio", "name": "plan", "value": "team" } }
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let fields = extract_fields(&page, form, ExtractorOptions::default());

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind, FieldKind::Radio);
    assert_eq!(fields[0].identifier, "plan");
    assert_eq!(fields[0].options.len(), 3);
    assert!(fields[0].options.iter().any(|o| o.value == "pro" && o.selected));
}

#[test]
fn select_options_are_captured() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [{
                "tag": "select",
                "attrs": { "name": "country" },
                "children": [
                    { "tag": "option", "attrs": { "value": "us" }, "text": "United States" },
                    { "tag": "option", "attrs": { "value": "de", "selected": "" }, "text": "Germany" }
                ]
            }]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let fields = extract_fields(&page, form, ExtractorOptions::default());

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].kind, FieldKind::Select);
    assert_eq!(fields[0].options.len(), 2);
    assert_eq!(fields[0].options[1].text, "Germany");
    assert!(fields[0].options[1].selected);
}

#[test]
fn validation_rules_are_read_from_attributes() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [{
                "tag": "input",
                "attrs": {
                    "type": "password", "name": "pw",
                    "pattern": "[A-Za-z0-9]+", "minlength": "8"
                }
            }]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let fields = extract_fields(&page, form, ExtractorOptions::default());

    assert_eq!(fields[0].validation.pattern.as_deref(), Some("[A-Za-z0-9]+"));
    assert_eq!(fields[0].validation.min_length, Some(8));
    assert!(!fields[0].validation.is_empty());
}

// =========================================================================
// Label resolution priority
// =========================================================================

#[test]
fn explicit_label_beats_placeholder() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([
            label("email", "Email"),
            { "tag": "input", "attrs": { "type": "email", "id": "email", "placeholder": "you@example.com" } }
        ]),
    );
    let field = page.find_by_tag("input")[0];
    let (text, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::Explicit);
    assert_eq!(text, "Email");
}

#[test]
fn wrapping_label_is_found() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "label",
            "text": "Remember me",
            "children": [{ "tag": "input", "attrs": { "type": "checkbox", "name": "remember" } }]
        }]),
    );
    let field = page.find_by_tag("input")[0];
    let (text, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::Wrapping);
    assert_eq!(text, "Remember me");
}

#[test]
fn aria_label_beats_placeholder() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "input",
            "attrs": { "type": "text", "name": "n", "aria-label": "Full name", "placeholder": "Jane Doe" }
        }]),
    );
    let field = page.find_by_tag("input")[0];
    let (text, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::AriaLabel);
    assert_eq!(text, "Full name");
}

#[test]
fn aria_labelledby_collects_target_text() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([
            { "tag": "span", "attrs": { "id": "hdr" }, "text": "Your email" },
            { "tag": "input", "attrs": { "type": "email", "name": "e", "aria-labelledby": "hdr" } }
        ]),
    );
    let field = page.find_by_tag("input")[0];
    let (text, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::AriaLabelledBy);
    assert_eq!(text, "Your email");
}

#[test]
fn placeholder_is_a_weak_label() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{ "tag": "input", "attrs": { "type": "text", "name": "n", "placeholder": "Search" } }]),
    );
    let field = page.find_by_tag("input")[0];
    let (_, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::Placeholder);

    let fields = extract_fields(&page, 0, ExtractorOptions::default());
    assert!(!fields[0].has_real_label());
    assert!(fields[0].has_placeholder_label());
}

#[test]
fn unlabeled_field_has_no_source() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{ "tag": "input", "attrs": { "type": "text", "name": "n" } }]),
    );
    let field = page.find_by_tag("input")[0];
    let (text, source) = resolve_label(&page, field);
    assert_eq!(source, LabelSource::None);
    assert!(text.is_empty());
}

// =========================================================================
// Submit affordance and candidate assembly
// =========================================================================

#[test]
fn action_words_match_clickable_text() {
    let words = matched_action_words("Create Account Now");
    assert!(words.contains(&"create account".to_string()));
    assert!(matched_action_words("Read more").is_empty());
}

#[test]
fn candidate_detects_explicit_submit() {
    let page = login_page();
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert!(c.submit.explicit_submit);
    assert!(c.submit.action_words.contains(&"log in".to_string()));
    assert!(c.submit.has_action_url);
    assert!(c.is_form_element);
    assert_eq!(c.identifier, "login");
}

#[test]
fn action_url_alone_is_a_submit_affordance() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f", "action": "/save" },
            "children": [input("text", "a", false)]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert!(!c.submit.explicit_submit);
    assert!(c.submit.has_action_url);
    assert!(c.submit.present());
}

#[test]
fn hidden_token_field_is_flagged_but_not_listed() {
    let page = doc(
        "https://example.com/login",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                { "tag": "input", "attrs": { "type": "hidden", "name": "csrf_token", "value": "abc" } },
                input("password", "password", true),
                submit_button("Log in")
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert!(c.has_token_field);
    assert_eq!(c.fields.len(), 1);
    assert_eq!(c.fields[0].kind, FieldKind::Password);
}

#[test]
fn search_typed_input_is_flagged_and_kind_is_text() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [{ "tag": "input", "attrs": { "type": "search", "name": "q" } }]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert!(c.has_search_typed_field);
    assert_eq!(c.fields[0].kind, FieldKind::Text);
}

#[test]
fn significant_field_count_ignores_hidden_and_file() {
    let page = doc(
        "https://example.com/",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                input("text", "a", false),
                input("email", "b", false),
                { "tag": "input", "attrs": { "type": "file", "name": "attachment" } }
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert_eq!(c.fields.len(), 3);
    assert_eq!(c.significant_field_count(), 2);
}

#[test]
fn multibyte_surrounding_text_clips_on_a_char_boundary() {
    // 1 ascii byte followed by 3-byte chars, so the byte cap lands mid-char
    let copy = format!("x{}", "€".repeat(300));
    let page = doc(
        "https://example.com/login",
        "t",
        json!([{
            "tag": "form",
            "attrs": { "id": "f" },
            "children": [
                { "tag": "p", "text": copy },
                input("email", "email", false),
                submit_button("Log in")
            ]
        }]),
    );
    let form = page.find_by_tag("form")[0];
    let c = build_candidate(&page, form, CandidateSource::Explicit, ExtractorOptions::default());

    assert!(c.surrounding_text.len() <= 600);
    assert!(c.surrounding_text.starts_with("x€"));
}
