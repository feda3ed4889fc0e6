use form_detection::dom::dom_model::{host_of, normalize_host, path_of};
use form_detection::field::field_model::{
    CandidateSource, FieldDescriptor, FieldKind, FormCandidate, LabelSource, SubmitAffordance,
    ValidationRules,
};
use form_detection::page::page_model::PageContext;

// =========================================================================
// Bare candidate builders, for exercising scoring and classification
// without going through the extractor
// =========================================================================

pub fn field(kind: FieldKind, name: &str) -> FieldDescriptor {
    FieldDescriptor {
        kind,
        identifier: name.to_string(),
        label_text: String::new(),
        label_source: LabelSource::None,
        required: false,
        validation: ValidationRules::default(),
        options: Vec::new(),
    }
}

pub fn labeled_field(kind: FieldKind, name: &str, label: &str) -> FieldDescriptor {
    FieldDescriptor {
        label_text: label.to_string(),
        label_source: LabelSource::Explicit,
        ..field(kind, name)
    }
}

pub fn candidate(identifier: &str, fields: Vec<FieldDescriptor>) -> FormCandidate {
    FormCandidate {
        identifier: identifier.to_string(),
        class_tokens: Vec::new(),
        role: None,
        action: None,
        target: None,
        depth: 2,
        source: CandidateSource::Explicit,
        fields,
        submit: SubmitAffordance::default(),
        surrounding_text: String::new(),
        is_form_element: true,
        has_fieldset: false,
        has_token_field: false,
        has_search_typed_field: false,
    }
}

pub fn with_submit(mut c: FormCandidate, words: &[&str]) -> FormCandidate {
    c.submit.explicit_submit = true;
    c.submit.action_words = words.iter().map(|w| w.to_string()).collect();
    c
}

pub fn page(url: &str, title: &str) -> PageContext {
    PageContext {
        url: url.to_string(),
        host: normalize_host(host_of(url)),
        path: path_of(url),
        title: title.to_string(),
        secure: url.starts_with("https://"),
        has_message_list: false,
    }
}
