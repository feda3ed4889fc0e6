use serde::Serialize;

// ============================================================================
// Field descriptors — the atomic unit the whole pipeline scores over
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Tel,
    Number,
    Date,
    Checkbox,
    Radio,
    Select,
    Textarea,
    File,
    Hidden,
    Other,
}

impl FieldKind {
    /// Kinds that count toward strict-mode structural requirements.
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Email
                | FieldKind::Password
                | FieldKind::Tel
                | FieldKind::Number
                | FieldKind::Select
                | FieldKind::Textarea
                | FieldKind::Checkbox
                | FieldKind::Radio
        )
    }
}

/// Where a field's label text came from. Placeholder-derived labels are
/// weak and earn half credit in label-coverage scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Explicit,
    Wrapping,
    AriaLabel,
    AriaLabelledBy,
    Placeholder,
    None,
}

impl LabelSource {
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            LabelSource::Explicit
                | LabelSource::Wrapping
                | LabelSource::AriaLabel
                | LabelSource::AriaLabelledBy
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationRules {
    pub pattern: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

/// Immutable description of one interactive control. Built fresh on every
/// analysis pass and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub identifier: String,
    pub label_text: String,
    pub label_source: LabelSource,
    pub required: bool,
    pub validation: ValidationRules,
    pub options: Vec<FieldOption>,
}

impl FieldDescriptor {
    pub fn has_real_label(&self) -> bool {
        self.label_source.is_real() && !self.label_text.is_empty()
    }

    pub fn has_placeholder_label(&self) -> bool {
        self.label_source == LabelSource::Placeholder && !self.label_text.is_empty()
    }

    /// Lowercased identifier + label, for token matching.
    pub fn token_blob(&self) -> String {
        format!(
            "{} {}",
            self.identifier.to_lowercase(),
            self.label_text.to_lowercase()
        )
    }
}

// ============================================================================
// Form candidates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// An explicit form container (form tag or role=form)
    Explicit,
    /// An inferred cluster of controls sharing a common ancestor
    Implicit,
}

/// How the candidate can be submitted. All flags are captured at extraction
/// time so scoring stays a pure function of the candidate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmitAffordance {
    /// An input[type=submit] / button[type=submit] (or default-type button
    /// inside a form) exists
    pub explicit_submit: bool,
    /// Action words matched on the submit control or other clickables
    pub action_words: Vec<String>,
    /// A non-submit clickable whose text matches action wording
    pub wording_on_clickable: bool,
    /// Container carries an onsubmit handler
    pub has_submit_handler: bool,
    /// Container carries a non-empty action url
    pub has_action_url: bool,
}

impl SubmitAffordance {
    pub fn present(&self) -> bool {
        self.explicit_submit
            || self.wording_on_clickable
            || self.has_submit_handler
            || self.has_action_url
    }
}

/// One container plus everything scoring and classification need to know
/// about it. The unit of scoring; owns its data, never shared mutably.
#[derive(Debug, Clone, Serialize)]
pub struct FormCandidate {
    pub identifier: String,
    pub class_tokens: Vec<String>,
    pub role: Option<String>,
    pub action: Option<String>,
    pub target: Option<String>,
    pub depth: usize,
    pub source: CandidateSource,
    pub fields: Vec<FieldDescriptor>,
    pub submit: SubmitAffordance,
    /// Text in and immediately around the container, clipped, lowercased
    pub surrounding_text: String,
    /// Container is a form element proper (vs role=form or a cluster)
    pub is_form_element: bool,
    pub has_fieldset: bool,
    /// A hidden csrf/token field was seen during extraction (hidden fields
    /// themselves are excluded from `fields` by default)
    pub has_token_field: bool,
    /// An input[type=search] was seen (its descriptor kind is Text)
    pub has_search_typed_field: bool,
}

impl FormCandidate {
    pub fn significant_field_count(&self) -> usize {
        self.fields.iter().filter(|f| f.kind.is_significant()).count()
    }

    pub fn has_kind(&self, kind: FieldKind) -> bool {
        self.fields.iter().any(|f| f.kind == kind)
    }

    /// Lowercased identifier + classes. Detectors that must not react to
    /// where a form submits (an action like "/send-message" says nothing
    /// about the container being a chat widget) match against this.
    pub fn naming_blob(&self) -> String {
        let mut blob = self.identifier.to_lowercase();
        for c in &self.class_tokens {
            blob.push(' ');
            blob.push_str(c);
        }
        blob
    }

    /// `naming_blob` plus the action url, for token matching that should
    /// cover the submit endpoint too.
    pub fn attr_blob(&self) -> String {
        let mut blob = self.naming_blob();
        if let Some(a) = &self.action {
            blob.push(' ');
            blob.push_str(&a.to_lowercase());
        }
        blob
    }
}
