use super::domain::{Confidence, ExtractedValue, ProposalIndicatorMap};
use super::extractor::parse_number;
use super::matcher::FuzzyMatcher;
use super::registry::IndicatorRegistry;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SheetImportError {
    #[error("failed to read proposal sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid proposal sheet data: {0}")]
    Csv(#[from] csv::Error),
}

/// Proposal values recovered from a `Proposal,Indicator,Value` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSheet {
    pub proposals: Vec<ProposalIndicatorMap>,
    /// Indicator labels that matched neither a registry id nor a synonym.
    pub unresolved_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Proposal")]
    proposal: String,
    #[serde(rename = "Indicator")]
    indicator: String,
    #[serde(rename = "Value", default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

struct ResolvedRow {
    indicator_id: String,
    strength: f64,
    value: ExtractedValue,
}

/// Imports hand-maintained indicator sheets. The indicator column may hold registry ids or
/// free-text labels; labels go through the fuzzy matcher.
pub struct ProposalSheetImporter;

impl ProposalSheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        registry: &IndicatorRegistry,
        matcher: &FuzzyMatcher,
    ) -> Result<ProposalSheet, SheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, registry, matcher)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        registry: &IndicatorRegistry,
        matcher: &FuzzyMatcher,
    ) -> Result<ProposalSheet, SheetImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut order: Vec<String> = Vec::new();
        let mut resolved: BTreeMap<String, BTreeMap<String, ResolvedRow>> = BTreeMap::new();
        let mut unresolved_labels: Vec<String> = Vec::new();

        for (index, record) in csv_reader.deserialize::<SheetRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            let proposal_id = row.proposal.trim();
            let label = row.indicator.trim();
            if proposal_id.is_empty() || label.is_empty() {
                debug!(line, "skipping sheet row without proposal or indicator");
                continue;
            }

            let (indicator_id, strength) = match registry.get(label) {
                Some(indicator) => (indicator.id.clone(), f64::INFINITY),
                None => {
                    if matcher.is_rollup_label(label) {
                        debug!(line, label, "skipping rollup row");
                        continue;
                    }
                    match matcher.match_one(label) {
                        Some(found) => (found.indicator_id, found.score),
                        None => {
                            if !unresolved_labels.iter().any(|known| known == label) {
                                unresolved_labels.push(label.to_string());
                            }
                            continue;
                        }
                    }
                }
            };

            let value = row_value(line, label, row.value.as_deref());
            if !resolved.contains_key(proposal_id) {
                order.push(proposal_id.to_string());
            }
            let rows = resolved.entry(proposal_id.to_string()).or_default();
            let keep_existing = rows
                .get(&indicator_id)
                .is_some_and(|existing| existing.strength >= strength);
            if !keep_existing {
                rows.insert(
                    indicator_id.clone(),
                    ResolvedRow {
                        indicator_id,
                        strength,
                        value,
                    },
                );
            }
        }

        let proposals = order
            .into_iter()
            .map(|proposal_id| {
                let mut map = ProposalIndicatorMap::new(proposal_id.clone());
                for indicator in registry.indicators() {
                    map.insert(indicator.id.clone(), ExtractedValue::not_found());
                }
                if let Some(rows) = resolved.remove(&proposal_id) {
                    for row in rows.into_values() {
                        map.insert(row.indicator_id, row.value);
                    }
                }
                map
            })
            .collect();

        Ok(ProposalSheet {
            proposals,
            unresolved_labels,
        })
    }
}

fn row_value(line: usize, label: &str, raw: Option<&str>) -> ExtractedValue {
    let Some(raw) = raw else {
        return ExtractedValue::not_found();
    };
    match parse_number(raw) {
        Some(value) => ExtractedValue::matched(value, format!("sheet row {line}: {label}")),
        None => ExtractedValue {
            value: None,
            evidence: format!("sheet row {line}: unreadable value '{raw}'"),
            confidence: Confidence::Unmatched,
        },
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn import(csv: &str) -> ProposalSheet {
        let registry = IndicatorRegistry::standard();
        let matcher = FuzzyMatcher::new(&registry);
        ProposalSheetImporter::from_reader(Cursor::new(csv), &registry, &matcher)
            .expect("import succeeds")
    }

    #[test]
    fn resolves_ids_and_labels() {
        let sheet = import(
            "Proposal,Indicator,Value\n\
             A,built_area,12 650\n\
             A,Plochy zelene,13 650\n\
             B,Zastavěná plocha,\"11 000,5\"\n",
        );

        assert_eq!(sheet.proposals.len(), 2);
        let a = &sheet.proposals[0];
        assert_eq!(a.proposal_id, "A");
        assert_eq!(a.raw_value("built_area"), Some(12650.0));
        assert_eq!(a.raw_value("green_area"), Some(13650.0));
        assert_eq!(a.values["paved_area"], ExtractedValue::not_found());
        assert_eq!(a.values.len(), IndicatorRegistry::standard().indicators().len());

        let b = &sheet.proposals[1];
        assert_eq!(b.raw_value("built_area"), Some(11000.5));
        assert!(sheet.unresolved_labels.is_empty());
    }

    #[test]
    fn registry_id_beats_fuzzy_label_for_same_indicator() {
        let sheet = import(
            "Proposal,Indicator,Value\n\
             A,Zastavena plocha,1\n\
             A,built_area,2\n\
             A,Zastavěná plocha,3\n",
        );
        assert_eq!(sheet.proposals[0].raw_value("built_area"), Some(2.0));
    }

    #[test]
    fn reports_unknown_labels_and_skips_rollups() {
        let sheet = import(
            "Proposal,Indicator,Value\n\
             A,Architektonická kvalita,5\n\
             A,Ukazatele celkem,99\n\
             A,Architektonická kvalita,4\n",
        );
        assert_eq!(sheet.unresolved_labels, vec!["Architektonická kvalita"]);
        assert!(sheet.proposals.is_empty());
    }

    #[test]
    fn blank_and_unreadable_values_stay_unmatched() {
        let sheet = import(
            "Proposal,Indicator,Value\n\
             A,built_area,\n\
             A,green_area,n/a\n",
        );
        let a = &sheet.proposals[0];
        assert_eq!(a.values["built_area"], ExtractedValue::not_found());
        assert_eq!(a.values["green_area"].value, None);
        assert_eq!(a.values["green_area"].confidence, Confidence::Unmatched);
        assert!(a.values["green_area"].evidence.contains("n/a"));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let registry = IndicatorRegistry::standard();
        let matcher = FuzzyMatcher::new(&registry);
        let error =
            ProposalSheetImporter::from_path("./does-not-exist.csv", &registry, &matcher)
                .expect_err("expected io error");
        match error {
            SheetImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
