use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the numeric run following a label is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberCapture {
    /// Thousands groups separated by a single space are joined (`40 690` -> `40690`).
    #[default]
    Grouped,
    /// Only the first contiguous digit run belongs to the indicator.
    FirstRun,
}

/// One extraction rule of an indicator. Rules are evaluated in registration order and the
/// first one that yields a number wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionRule {
    /// `<label> <number>`
    Simple {
        label: String,
        #[serde(default)]
        capture: NumberCapture,
    },
    /// `<label> (<aside>) <number>`
    ParentheticalSkip {
        label: String,
        #[serde(default)]
        capture: NumberCapture,
    },
}

impl ExtractionRule {
    pub fn simple(label: impl Into<String>) -> Self {
        Self::Simple {
            label: label.into(),
            capture: NumberCapture::Grouped,
        }
    }

    pub fn parenthetical(label: impl Into<String>) -> Self {
        Self::ParentheticalSkip {
            label: label.into(),
            capture: NumberCapture::Grouped,
        }
    }

    pub fn first_run(label: impl Into<String>) -> Self {
        Self::Simple {
            label: label.into(),
            capture: NumberCapture::FirstRun,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Simple { label, .. } | Self::ParentheticalSkip { label, .. } => label,
        }
    }

    pub fn capture(&self) -> NumberCapture {
        match self {
            Self::Simple { capture, .. } | Self::ParentheticalSkip { capture, .. } => *capture,
        }
    }
}

/// Static registry entry describing a comparable metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub lower_is_better: bool,
    #[serde(default)]
    pub patterns: Vec<ExtractionRule>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Provenance tag attached to every extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Matched,
    Derived,
    Fallback,
    Unmatched,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Derived => "derived",
            Self::Fallback => "fallback",
            Self::Unmatched => "unmatched",
        }
    }

    pub const fn needs_review(self) -> bool {
        matches!(self, Self::Fallback | Self::Unmatched)
    }
}

pub const NOT_FOUND_EVIDENCE: &str = "not found";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    pub value: Option<f64>,
    pub evidence: String,
    pub confidence: Confidence,
}

impl ExtractedValue {
    pub fn matched(value: f64, evidence: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            evidence: evidence.into(),
            confidence: Confidence::Matched,
        }
    }

    pub fn derived(value: f64, evidence: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            evidence: evidence.into(),
            confidence: Confidence::Derived,
        }
    }

    pub fn fallback(value: f64, evidence: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            evidence: evidence.into(),
            confidence: Confidence::Fallback,
        }
    }

    pub fn not_found() -> Self {
        Self {
            value: None,
            evidence: NOT_FOUND_EVIDENCE.to_string(),
            confidence: Confidence::Unmatched,
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// Indicator values of a single proposal keyed by indicator id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalIndicatorMap {
    pub proposal_id: String,
    #[serde(default)]
    pub values: BTreeMap<String, ExtractedValue>,
}

impl ProposalIndicatorMap {
    pub fn new(proposal_id: impl Into<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            values: BTreeMap::new(),
        }
    }

    /// Finite raw value for an indicator; NaN and infinities count as missing.
    pub fn raw_value(&self, indicator_id: &str) -> Option<f64> {
        self.values
            .get(indicator_id)
            .and_then(|entry| entry.value)
            .filter(|value| value.is_finite())
    }

    pub fn insert(&mut self, indicator_id: impl Into<String>, value: ExtractedValue) {
        self.values.insert(indicator_id.into(), value);
    }

    pub fn matched_count(&self) -> usize {
        self.values
            .values()
            .filter(|entry| entry.confidence == Confidence::Matched)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_rules_deserialize_from_tagged_json() {
        let rules: Vec<ExtractionRule> = serde_json::from_str(
            r#"[
                {"kind": "simple", "label": "zastavěná plocha"},
                {"kind": "parenthetical_skip", "label": "plochy zeleně", "capture": "first_run"}
            ]"#,
        )
        .expect("rules parse");

        assert_eq!(rules[0], ExtractionRule::simple("zastavěná plocha"));
        assert_eq!(rules[1].capture(), NumberCapture::FirstRun);
        assert_eq!(rules[1].label(), "plochy zeleně");
    }

    #[test]
    fn raw_value_ignores_non_finite_edits() {
        let mut map = ProposalIndicatorMap::new("A");
        map.insert(
            "built_area",
            ExtractedValue {
                value: Some(f64::NAN),
                evidence: "edited".to_string(),
                confidence: Confidence::Matched,
            },
        );
        assert_eq!(map.raw_value("built_area"), None);
        assert_eq!(map.raw_value("green_area"), None);
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_string(&ExtractedValue::not_found()).expect("serialize");
        assert!(json.contains("\"unmatched\""));
        assert!(json.contains("\"not found\""));
        assert!(Confidence::Fallback.needs_review());
        assert!(!Confidence::Derived.needs_review());
    }
}
