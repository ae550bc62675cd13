mod fallback;
mod numbers;
mod preprocess;
mod rules;

pub(crate) use numbers::parse_number;

use super::domain::{Confidence, ExtractedValue, ProposalIndicatorMap};
use super::registry::{FallbackSlots, IndicatorRegistry, RegistryError, ResidualRule};
use rules::CompiledRule;
use std::collections::BTreeMap;
use tracing::debug;

struct IndicatorRules {
    indicator_id: String,
    rules: Vec<CompiledRule>,
}

/// Recovers indicator values from plain document text using the registry's ordered rules.
///
/// The extractor owns its compiled rules, so one instance can serve any number of
/// documents; it keeps no state between calls.
pub struct PatternExtractor {
    indicators: Vec<IndicatorRules>,
    residual: Option<ResidualRule>,
    fallback: FallbackSlots,
}

impl PatternExtractor {
    pub fn new(registry: &IndicatorRegistry) -> Result<Self, RegistryError> {
        let indicators = registry
            .indicators()
            .iter()
            .map(|indicator| {
                let rules = indicator
                    .patterns
                    .iter()
                    .map(CompiledRule::compile)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| RegistryError::InvalidPattern {
                        indicator: indicator.id.clone(),
                        source,
                    })?;
                Ok(IndicatorRules {
                    indicator_id: indicator.id.clone(),
                    rules,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Ok(Self {
            indicators,
            residual: registry.residual().cloned(),
            fallback: registry.fallback().clone(),
        })
    }

    /// Extracts one value per registered indicator. Absent indicators are reported as
    /// `not found`; nothing in the document text can make this fail.
    pub fn extract(&self, document: &str) -> BTreeMap<String, ExtractedValue> {
        let prepared = preprocess::prepare(document);
        let mut values = BTreeMap::new();

        for indicator in &self.indicators {
            let hit = indicator.rules.iter().enumerate().find_map(|(index, rule)| {
                rule.apply(&prepared.text).map(|hit| (index, rule, hit))
            });

            let value = match hit {
                Some((index, rule, hit)) => {
                    debug!(
                        indicator = %indicator.indicator_id,
                        rule = index,
                        label = rule.rule().label(),
                        value = hit.value,
                        "indicator matched"
                    );
                    ExtractedValue::matched(hit.value, hit.evidence)
                }
                None => ExtractedValue::not_found(),
            };
            values.insert(indicator.indicator_id.clone(), value);
        }

        let matched_by_name = values
            .values()
            .filter(|value| value.confidence == Confidence::Matched)
            .count();

        if let Some(residual) = &self.residual {
            apply_residual(residual, &mut values);
        }

        if matched_by_name == 0 {
            debug!("no indicator labels recognised, running generic fallback scan");
            self.apply_fallback(&prepared.with_units, &mut values);
        }

        values
    }

    pub fn extract_proposal(
        &self,
        proposal_id: impl Into<String>,
        document: &str,
    ) -> ProposalIndicatorMap {
        ProposalIndicatorMap {
            proposal_id: proposal_id.into(),
            values: self.extract(document),
        }
    }

    fn apply_fallback(&self, text_with_units: &str, values: &mut BTreeMap<String, ExtractedValue>) {
        let scan = fallback::scan(text_with_units);
        let slots = [
            (&self.fallback.area, scan.area, "area"),
            (&self.fallback.ratio, scan.ratio, "ratio"),
            (&self.fallback.count, scan.count, "count"),
        ];

        for (slot, found, kind) in slots {
            let (Some(indicator_id), Some((value, snippet))) = (slot, found) else {
                continue;
            };
            let entry = values
                .entry(indicator_id.clone())
                .or_insert_with(ExtractedValue::not_found);
            if entry.value.is_some() {
                continue;
            }
            debug!(indicator = %indicator_id, kind, value, "fallback value assigned");
            *entry = ExtractedValue::fallback(value, format!("fallback {kind} scan: {snippet}"));
        }
    }
}

/// Convenience wrapper compiling the registry for a single document.
pub fn extract(
    document: &str,
    registry: &IndicatorRegistry,
) -> Result<BTreeMap<String, ExtractedValue>, RegistryError> {
    Ok(PatternExtractor::new(registry)?.extract(document))
}

fn apply_residual(rule: &ResidualRule, values: &mut BTreeMap<String, ExtractedValue>) {
    let direct = values
        .get(&rule.indicator_id)
        .is_some_and(|value| value.value.is_some());
    if direct {
        return;
    }

    let component = |id: &str| values.get(id).and_then(|value| value.value);
    let Some(total) = component(rule.total_id.as_str()) else {
        return;
    };
    let mut remainder = total;
    for id in &rule.component_ids {
        match component(id.as_str()) {
            Some(part) => remainder -= part,
            None => return,
        }
    }

    if remainder < 0.0 || !remainder.is_finite() {
        debug!(
            indicator = %rule.indicator_id,
            remainder,
            "residual indicator rejected"
        );
        return;
    }

    let evidence = format!(
        "derived: {} - {}",
        rule.total_id,
        rule.component_ids.join(" - ")
    );
    values.insert(
        rule.indicator_id.clone(),
        ExtractedValue::derived(remainder, evidence),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::domain::{ExtractionRule, IndicatorDefinition};

    fn indicator(id: &str, patterns: Vec<ExtractionRule>) -> IndicatorDefinition {
        IndicatorDefinition {
            id: id.to_string(),
            name: id.to_string(),
            unit: "m²".to_string(),
            category: "land_use".to_string(),
            lower_is_better: false,
            patterns,
            synonyms: Vec::new(),
        }
    }

    fn area_registry() -> IndicatorRegistry {
        IndicatorRegistry::new(
            vec![
                indicator("total", vec![ExtractionRule::simple("plocha řešeného území")]),
                indicator("built", vec![ExtractionRule::simple("zastavěná plocha")]),
                indicator("green", vec![ExtractionRule::simple("plochy zeleně")]),
                indicator("paved", vec![ExtractionRule::simple("zpevněné plochy")]),
                indicator("other", vec![ExtractionRule::simple("ostatní plochy")]),
                indicator("ratio", Vec::new()),
                indicator("count", Vec::new()),
            ],
            Some(ResidualRule {
                indicator_id: "other".to_string(),
                total_id: "total".to_string(),
                component_ids: vec![
                    "built".to_string(),
                    "green".to_string(),
                    "paved".to_string(),
                ],
            }),
            FallbackSlots {
                area: Some("total".to_string()),
                ratio: Some("ratio".to_string()),
                count: Some("count".to_string()),
            },
        )
        .expect("valid registry")
    }

    const AREA_TABLE: &str = "Plocha řešeného území 40 690 m²\n\
        Zastavěná plocha 12 650 m²\n\
        Plochy zeleně 13 650 m²\n\
        Zpevněné plochy 14 390 m²";

    #[test]
    fn derives_residual_when_all_components_present() {
        let values = extract(AREA_TABLE, &area_registry()).expect("extract");
        assert_eq!(values["total"].value, Some(40690.0));
        let other = &values["other"];
        assert_eq!(other.value, Some(0.0));
        assert_eq!(other.confidence, Confidence::Derived);
    }

    #[test]
    fn direct_match_beats_residual() {
        let text = format!("{AREA_TABLE}\nOstatní plochy 120 m²");
        let values = extract(&text, &area_registry()).expect("extract");
        assert_eq!(values["other"].value, Some(120.0));
        assert_eq!(values["other"].confidence, Confidence::Matched);
    }

    #[test]
    fn negative_residual_stays_unmatched() {
        let text = "Plocha řešeného území 100\nZastavěná plocha 80\nPlochy zeleně 30\nZpevněné plochy 0";
        let values = extract(text, &area_registry()).expect("extract");
        assert_eq!(values["other"], ExtractedValue::not_found());
    }

    #[test]
    fn residual_requires_every_component() {
        let text = "Plocha řešeného území 100\nZastavěná plocha 80";
        let values = extract(text, &area_registry()).expect("extract");
        assert_eq!(values["other"].confidence, Confidence::Unmatched);
        assert_eq!(values["other"].evidence, "not found");
    }

    #[test]
    fn first_matching_rule_wins() {
        let registry = IndicatorRegistry::new(
            vec![indicator(
                "built",
                vec![
                    ExtractionRule::parenthetical("zastavěná plocha"),
                    ExtractionRule::simple("zastavěná plocha"),
                ],
            )],
            None,
            FallbackSlots::default(),
        )
        .expect("valid registry");
        let text = "zastavěná plocha 999 ... zastavěná plocha (objekty) 12 650";
        let values = extract(text, &registry).expect("extract");
        assert_eq!(values["built"].value, Some(12650.0));
    }

    #[test]
    fn fallback_runs_only_when_nothing_matched_by_name() {
        let values = extract(
            "Návrh řeší území o rozloze 38 000 m², zeleň tvoří 42 % a vznikne 210 bytů.",
            &area_registry(),
        )
        .expect("extract");
        assert_eq!(values["total"].value, Some(38000.0));
        assert_eq!(values["total"].confidence, Confidence::Fallback);
        assert_eq!(values["ratio"].value, Some(42.0));
        assert_eq!(values["count"].value, Some(210.0));
        assert_eq!(values["built"].confidence, Confidence::Unmatched);

        let values = extract(
            "Zastavěná plocha 500, rozloha 38 000 m², 42 %",
            &area_registry(),
        )
        .expect("extract");
        assert_eq!(values["total"].confidence, Confidence::Unmatched);
        assert_eq!(values["ratio"].value, None);
    }

    #[test]
    fn every_indicator_is_reported() {
        let values = extract("", &area_registry()).expect("extract");
        assert_eq!(values.len(), 7);
        assert!(values
            .values()
            .all(|value| value.confidence == Confidence::Unmatched));
    }

    #[test]
    fn extraction_is_repeatable() {
        let extractor = PatternExtractor::new(&area_registry()).expect("compile");
        let first = extractor.extract_proposal("A", AREA_TABLE);
        let second = extractor.extract_proposal("A", AREA_TABLE);
        assert_eq!(first, second);
        assert_eq!(first.matched_count(), 4);
    }

    #[test]
    fn share_column_after_unit_stays_separate() {
        let text = "Plocha řešeného území 40 690 m² 100 %\nZastavěná plocha 12 650 m² 31 %";
        let values = extract(text, &area_registry()).expect("extract");
        assert_eq!(values["total"].value, Some(40690.0));
        assert_eq!(values["total"].evidence, "plocha řešeného území 40 690");
        assert_eq!(values["built"].value, Some(12650.0));
    }

    #[test]
    fn footnote_inside_aside_does_not_borrow_next_row() {
        let text = "Zastavěná plocha (viz 1) 12 650 m²\nPlochy zeleně (parky) 13 650";
        let values = extract(text, &IndicatorRegistry::standard()).expect("extract");
        assert_eq!(values["green_area"].value, Some(13650.0));
        assert_eq!(values["built_area"].confidence, Confidence::Unmatched);
        assert_eq!(values["built_area"].value, None);
    }
}
