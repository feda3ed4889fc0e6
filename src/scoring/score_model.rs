use serde::Serialize;

use crate::exclusion::detectors::ExclusionMatch;

// ============================================================================
// Score model — factor names, weights, breakdowns, verdicts
// ============================================================================

/// Factor weights. Must sum to exactly 100; `weights_sum()` is asserted in
/// tests and the breakdown invariant (`sum of contributions <= 100`) follows
/// from it.
pub const WEIGHTS: &[(&str, u32)] = &[
    ("required_structural_elements", 20),
    ("field_count", 10),
    ("submit_affordance", 10),
    ("label_association", 10),
    ("field_type_diversity", 10),
    ("form_level_attributes", 10),
    ("semantic_match", 10),
    ("validation_presence", 5),
    ("structured_layout", 5),
    ("secure_context", 5),
    ("page_context", 5),
];

pub fn weights_sum() -> u32 {
    WEIGHTS.iter().map(|(_, w)| w).sum()
}

pub fn weight_of(name: &str) -> u32 {
    WEIGHTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, w)| *w)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub name: String,
    /// Raw factor value, 0..=100
    pub raw: f32,
    pub weight: u32,
    /// raw * weight / 100
    pub contribution: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorScore>,
    /// Sum of contributions, capped at 100
    pub total: f32,
}

impl ScoreBreakdown {
    pub fn from_raw(raws: Vec<(&'static str, f32)>) -> Self {
        let factors: Vec<FactorScore> = raws
            .into_iter()
            .map(|(name, raw)| {
                let raw = raw.clamp(0.0, 100.0);
                let weight = weight_of(name);
                FactorScore {
                    name: name.to_string(),
                    raw,
                    weight,
                    contribution: raw * weight as f32 / 100.0,
                }
            })
            .collect();
        let total = factors
            .iter()
            .map(|f| f.contribution)
            .sum::<f32>()
            .min(100.0);
        Self { factors, total }
    }

    pub fn raw_of(&self, name: &str) -> Option<f32> {
        self.factors.iter().find(|f| f.name == name).map(|f| f.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Ok,
    BelowThreshold,
    Excluded,
    StrictFieldCount,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Ok => "OK",
            ReasonCode::BelowThreshold => "BELOW_THRESHOLD",
            ReasonCode::Excluded => "EXCLUDED",
            ReasonCode::StrictFieldCount => "STRICT_FIELD_COUNT",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegitimacyVerdict {
    pub legitimate: bool,
    /// Final score after strict-mode adjustments, 0..=100
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    pub reason_code: ReasonCode,
    pub exclusion: Option<ExclusionMatch>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Legitimacy threshold on the final score
    pub threshold: f32,
    /// Strict mode: structural floor + missing-submit penalty
    pub strict: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 75.0,
            strict: false,
        }
    }
}

/// Strict mode needs at least this many significant fields.
pub const STRICT_MIN_SIGNIFICANT_FIELDS: usize = 3;
/// Strict-mode penalty when no explicit submit control exists.
pub const STRICT_NO_SUBMIT_PENALTY: f32 = 20.0;
