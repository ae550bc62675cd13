use super::ScoringError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight applied when an indicator or category has no explicit percentage.
pub const NEUTRAL_WEIGHT_PERCENT: f64 = 100.0;

fn neutral_weight() -> f64 {
    NEUTRAL_WEIGHT_PERCENT
}

/// Indicator and category weight percentages supplied by the caller for one scoring run.
/// Percentages are not required to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub indicators: BTreeMap<String, f64>,
    #[serde(default)]
    pub categories: BTreeMap<String, f64>,
    #[serde(default = "neutral_weight")]
    pub default_percent: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            indicators: BTreeMap::new(),
            categories: BTreeMap::new(),
            default_percent: NEUTRAL_WEIGHT_PERCENT,
        }
    }
}

impl WeightConfig {
    pub fn with_indicator(mut self, indicator_id: impl Into<String>, percent: f64) -> Self {
        self.indicators.insert(indicator_id.into(), percent);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, percent: f64) -> Self {
        self.categories.insert(category.into(), percent);
        self
    }

    pub fn indicator_percent(&self, indicator_id: &str) -> f64 {
        self.indicators
            .get(indicator_id)
            .copied()
            .unwrap_or(self.default_percent)
    }

    pub fn category_percent(&self, category: &str) -> f64 {
        self.categories
            .get(category)
            .copied()
            .unwrap_or(self.default_percent)
    }

    pub(crate) fn validate(&self) -> Result<(), ScoringError> {
        let explicit = self
            .indicators
            .iter()
            .chain(self.categories.iter())
            .map(|(key, value)| (key.as_str(), *value));

        for (key, value) in std::iter::once(("default", self.default_percent)).chain(explicit) {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    key: key.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_weights_fall_back_to_neutral_share() {
        let weights = WeightConfig::default()
            .with_indicator("built_area", 30.0)
            .with_category("land_use", 60.0);
        assert_eq!(weights.indicator_percent("built_area"), 30.0);
        assert_eq!(weights.indicator_percent("green_area"), NEUTRAL_WEIGHT_PERCENT);
        assert_eq!(weights.category_percent("mobility"), NEUTRAL_WEIGHT_PERCENT);
    }

    #[test]
    fn deserializes_partial_documents() {
        let weights: WeightConfig =
            serde_json::from_str(r#"{"indicators": {"built_area": 25}}"#).expect("parse");
        assert_eq!(weights.default_percent, NEUTRAL_WEIGHT_PERCENT);
        assert!(weights.categories.is_empty());
    }

    #[test]
    fn rejects_negative_weights() {
        let error = WeightConfig::default()
            .with_category("mobility", -5.0)
            .validate()
            .expect_err("negative weight");
        assert!(matches!(error, ScoringError::InvalidWeight { key, .. } if key == "mobility"));
    }

    #[test]
    fn weights_need_not_sum_to_hundred() {
        let weights = WeightConfig::default()
            .with_indicator("a", 70.0)
            .with_indicator("b", 70.0);
        assert!(weights.validate().is_ok());
    }
}
