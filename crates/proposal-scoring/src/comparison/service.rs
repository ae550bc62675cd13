use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Confidence, IndicatorDefinition, ProposalIndicatorMap};
use super::extractor::PatternExtractor;
use super::matcher::{FuzzyMatcher, IndicatorMatch};
use super::registry::{IndicatorRegistry, RegistryError};
use super::scoring::{
    self, share_of_maximum, RankingEntry, ScoreBoard, ScoringError, ShareOfMaximum,
    WeightConfig,
};
use super::sheet::{ProposalSheet, ProposalSheetImporter, SheetImportError};

/// Plain text of one competition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDocument {
    pub proposal_id: String,
    pub text: String,
}

/// Outcome of matching a single free-text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatch {
    pub label: String,
    #[serde(rename = "match")]
    pub matched: Option<IndicatorMatch>,
}

/// Value an analyst should double-check before trusting the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub proposal_id: String,
    pub indicator_id: String,
    pub confidence: Confidence,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub proposals: Vec<ProposalIndicatorMap>,
    pub board: ScoreBoard,
    pub ranking: Vec<RankingEntry>,
    pub shares: Vec<ShareOfMaximum>,
    pub review: Vec<ReviewFlag>,
}

/// Service composing the registry, the compiled extractor, and the label matcher.
pub struct ComparisonService {
    registry: Arc<IndicatorRegistry>,
    extractor: PatternExtractor,
    matcher: FuzzyMatcher,
}

impl ComparisonService {
    pub fn new(registry: IndicatorRegistry, match_threshold: f64) -> Result<Self, RegistryError> {
        let extractor = PatternExtractor::new(&registry)?;
        let matcher = FuzzyMatcher::with_threshold(&registry, match_threshold);
        Ok(Self {
            registry: Arc::new(registry),
            extractor,
            matcher,
        })
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    pub fn extract(&self, document: &ProposalDocument) -> ProposalIndicatorMap {
        let map = self
            .extractor
            .extract_proposal(document.proposal_id.clone(), &document.text);
        info!(
            proposal = %map.proposal_id,
            matched = map.matched_count(),
            "proposal extracted"
        );
        map
    }

    pub fn match_labels<S: AsRef<str>>(&self, labels: &[S]) -> Vec<LabelMatch> {
        labels
            .iter()
            .map(|label| LabelMatch {
                label: label.as_ref().to_string(),
                matched: self.matcher.match_one(label.as_ref()),
            })
            .collect()
    }

    /// Strongest label per indicator, as used when importing third-party tables.
    pub fn match_batch<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> std::collections::BTreeMap<String, String> {
        self.matcher.match_batch(labels)
    }

    /// Scores proposals against the selected indicators, or the full registry when no
    /// selection is given.
    pub fn score(
        &self,
        proposals: &[ProposalIndicatorMap],
        indicator_ids: Option<&[String]>,
        weights: &WeightConfig,
    ) -> Result<ScoreBoard, ComparisonServiceError> {
        let indicators = self.selection(indicator_ids)?;
        let board = scoring::score(proposals, &indicators, weights)?;
        info!(
            proposals = proposals.len(),
            indicators = indicators.len(),
            "proposals scored"
        );
        Ok(board)
    }

    /// Extracts every document and scores the results in one pass.
    pub fn compare(
        &self,
        documents: &[ProposalDocument],
        indicator_ids: Option<&[String]>,
        weights: &WeightConfig,
    ) -> Result<ComparisonReport, ComparisonServiceError> {
        let proposals: Vec<ProposalIndicatorMap> =
            documents.iter().map(|document| self.extract(document)).collect();
        self.report(proposals, indicator_ids, weights)
    }

    /// Builds the full report for proposals whose values are already known.
    pub fn report(
        &self,
        proposals: Vec<ProposalIndicatorMap>,
        indicator_ids: Option<&[String]>,
        weights: &WeightConfig,
    ) -> Result<ComparisonReport, ComparisonServiceError> {
        let indicators = self.selection(indicator_ids)?;
        let board = scoring::score(&proposals, &indicators, weights)?;
        let ranking = board.ranking();
        let shares = share_of_maximum(&proposals, &indicators);
        let review = review_flags(&proposals, &indicators);

        Ok(ComparisonReport {
            proposals,
            board,
            ranking,
            shares,
            review,
        })
    }

    pub fn import_sheet<R: Read>(&self, reader: R) -> Result<ProposalSheet, SheetImportError> {
        ProposalSheetImporter::from_reader(reader, &self.registry, &self.matcher)
    }

    fn selection(
        &self,
        indicator_ids: Option<&[String]>,
    ) -> Result<Vec<IndicatorDefinition>, RegistryError> {
        match indicator_ids {
            Some(ids) => self.registry.select(ids),
            None => Ok(self.registry.indicators().to_vec()),
        }
    }
}

fn review_flags(
    proposals: &[ProposalIndicatorMap],
    indicators: &[IndicatorDefinition],
) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();
    for proposal in proposals {
        for indicator in indicators {
            let Some(value) = proposal.values.get(&indicator.id) else {
                continue;
            };
            if value.confidence == Confidence::Fallback {
                flags.push(ReviewFlag {
                    proposal_id: proposal.proposal_id.clone(),
                    indicator_id: indicator.id.clone(),
                    confidence: value.confidence,
                    evidence: value.evidence.clone(),
                });
            }
        }
    }
    flags
}

/// Error raised by the comparison service.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
