mod standard;

use super::domain::IndicatorDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Indicator computed as `total - sum(components)` when it is not stated directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualRule {
    pub indicator_id: String,
    pub total_id: String,
    pub component_ids: Vec<String>,
}

/// Indicators receiving values from the generic scan when no label matched at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSlots {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub ratio: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("indicator registry is empty")]
    Empty,
    #[error("indicator at position {index} has an empty id")]
    EmptyIndicatorId { index: usize },
    #[error("indicator '{0}' is registered more than once")]
    DuplicateIndicator(String),
    #[error("indicator '{indicator}' has an extraction rule with an empty label")]
    EmptyRuleLabel { indicator: String },
    #[error("indicator '{indicator}' has an invalid extraction rule: {source}")]
    InvalidPattern {
        indicator: String,
        #[source]
        source: regex::Error,
    },
    #[error("residual indicator '{residual}' references unknown indicator '{input}'")]
    UnknownResidualInput { residual: String, input: String },
    #[error("residual indicator '{0}' cannot be derived from itself")]
    ResidualSelfReference(String),
    #[error("fallback {slot} slot references unknown indicator '{indicator}'")]
    UnknownFallbackSlot {
        slot: &'static str,
        indicator: String,
    },
    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),
    #[error("failed to read indicator registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid indicator registry document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a registry as supplied by a configuration collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub indicators: Vec<IndicatorDefinition>,
    #[serde(default)]
    pub residual: Option<ResidualRule>,
    #[serde(default)]
    pub fallback: FallbackSlots,
}

/// Validated, read-only set of indicator definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRegistry {
    indicators: Vec<IndicatorDefinition>,
    residual: Option<ResidualRule>,
    fallback: FallbackSlots,
}

impl IndicatorRegistry {
    pub fn new(
        indicators: Vec<IndicatorDefinition>,
        residual: Option<ResidualRule>,
        fallback: FallbackSlots,
    ) -> Result<Self, RegistryError> {
        if indicators.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(indicators.len());
        for (index, indicator) in indicators.iter().enumerate() {
            if indicator.id.trim().is_empty() {
                return Err(RegistryError::EmptyIndicatorId { index });
            }
            if !seen.insert(indicator.id.as_str()) {
                return Err(RegistryError::DuplicateIndicator(indicator.id.clone()));
            }
            if indicator
                .patterns
                .iter()
                .any(|rule| rule.label().trim().is_empty())
            {
                return Err(RegistryError::EmptyRuleLabel {
                    indicator: indicator.id.clone(),
                });
            }
        }

        if let Some(rule) = &residual {
            let inputs = std::iter::once(&rule.total_id).chain(rule.component_ids.iter());
            for input in std::iter::once(&rule.indicator_id).chain(inputs.clone()) {
                if !seen.contains(input.as_str()) {
                    return Err(RegistryError::UnknownResidualInput {
                        residual: rule.indicator_id.clone(),
                        input: input.clone(),
                    });
                }
            }
            if inputs.into_iter().any(|input| *input == rule.indicator_id) {
                return Err(RegistryError::ResidualSelfReference(
                    rule.indicator_id.clone(),
                ));
            }
        }

        for (slot, target) in [
            ("area", &fallback.area),
            ("ratio", &fallback.ratio),
            ("count", &fallback.count),
        ] {
            if let Some(indicator) = target {
                if !seen.contains(indicator.as_str()) {
                    return Err(RegistryError::UnknownFallbackSlot {
                        slot,
                        indicator: indicator.clone(),
                    });
                }
            }
        }

        Ok(Self {
            indicators,
            residual,
            fallback,
        })
    }

    /// Built-in registry for urban-planning competition entries.
    pub fn standard() -> Self {
        standard::registry()
    }

    pub fn from_document(document: RegistryDocument) -> Result<Self, RegistryError> {
        Self::new(document.indicators, document.residual, document.fallback)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let document: RegistryDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn indicators(&self) -> &[IndicatorDefinition] {
        &self.indicators
    }

    pub fn get(&self, id: &str) -> Option<&IndicatorDefinition> {
        self.indicators.iter().find(|indicator| indicator.id == id)
    }

    pub fn residual(&self) -> Option<&ResidualRule> {
        self.residual.as_ref()
    }

    pub fn fallback(&self) -> &FallbackSlots {
        &self.fallback
    }

    /// Distinct categories in registration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for indicator in &self.indicators {
            if !categories.contains(&indicator.category.as_str()) {
                categories.push(&indicator.category);
            }
        }
        categories
    }

    /// Definitions for the requested ids, in the requested order.
    pub fn select<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<IndicatorDefinition>, RegistryError> {
        ids.iter()
            .map(|id| {
                self.get(id.as_ref())
                    .cloned()
                    .ok_or_else(|| RegistryError::UnknownIndicator(id.as_ref().to_string()))
            })
            .collect()
    }

    pub fn to_document(&self) -> RegistryDocument {
        RegistryDocument {
            indicators: self.indicators.clone(),
            residual: self.residual.clone(),
            fallback: self.fallback.clone(),
        }
    }
}
