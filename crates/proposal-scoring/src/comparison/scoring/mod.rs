mod normalization;
mod presentation;
mod views;
mod weights;

pub use presentation::{share_of_maximum, ShareOfMaximum};
pub use views::{ProposalAggregateScore, RankingEntry, ScoreBoard, ScoreCell};
pub use weights::{WeightConfig, NEUTRAL_WEIGHT_PERCENT};

use super::domain::{IndicatorDefinition, ProposalIndicatorMap};
use normalization::ValueRange;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("no indicators selected for scoring")]
    NoIndicators,
    #[error("indicator '{0}' is selected more than once")]
    DuplicateIndicator(String),
    #[error("proposal '{0}' is listed more than once")]
    DuplicateProposal(String),
    #[error("weight '{key}' must be a finite, non-negative percentage (got {value})")]
    InvalidWeight { key: String, value: f64 },
}

#[derive(Default)]
struct Accumulator {
    weighted_sum: f64,
    weight_sum: f64,
    used: usize,
}

/// Scores every proposal against the selected indicators.
///
/// Normalization is computed per indicator across exactly the proposals passed in, so the
/// result depends only on the arguments. Missing values are left out of a proposal's
/// aggregate instead of counting as zero.
pub fn score(
    proposals: &[ProposalIndicatorMap],
    indicators: &[IndicatorDefinition],
    weights: &WeightConfig,
) -> Result<ScoreBoard, ScoringError> {
    validate(proposals, indicators, weights)?;

    let mut cells = Vec::with_capacity(proposals.len() * indicators.len());
    let mut totals: Vec<Accumulator> = proposals
        .iter()
        .map(|_| Accumulator::default())
        .collect();

    for indicator in indicators {
        let raw: Vec<Option<f64>> = proposals
            .iter()
            .map(|proposal| proposal.raw_value(&indicator.id))
            .collect();
        let range = ValueRange::of(raw.iter().flatten().copied());
        let best = range.map(|range| range.best(indicator.lower_is_better));

        let indicator_weight = weights.indicator_percent(&indicator.id);
        let category_weight = weights.category_percent(&indicator.category);
        let combined_weight = indicator_weight * category_weight;

        if range.is_none() {
            debug!(indicator = %indicator.id, "no proposal carries a value");
        }

        for ((proposal, raw_value), total) in proposals.iter().zip(&raw).zip(totals.iter_mut()) {
            let normalized_value = match (range, raw_value) {
                (Some(range), Some(value)) => {
                    Some(range.place(*value, indicator.lower_is_better))
                }
                _ => None,
            };
            let weighted_value = normalized_value.map(|normalized| {
                normalized * (indicator_weight / 100.0) * (category_weight / 100.0) * 100.0
            });
            let is_best_in_class = match (raw_value, best) {
                (Some(value), Some(best)) => *value == best,
                _ => false,
            };

            if let Some(normalized) = normalized_value {
                total.weighted_sum += normalized * combined_weight;
                total.weight_sum += combined_weight;
                total.used += 1;
            }

            cells.push(ScoreCell {
                proposal_id: proposal.proposal_id.clone(),
                indicator_id: indicator.id.clone(),
                raw_value: *raw_value,
                normalized_value,
                weighted_value,
                is_best_in_class,
            });
        }
    }

    let aggregates = proposals
        .iter()
        .zip(totals)
        .map(|(proposal, total)| ProposalAggregateScore {
            proposal_id: proposal.proposal_id.clone(),
            score: (total.weight_sum > 0.0).then(|| total.weighted_sum / total.weight_sum),
            indicators_used: total.used,
            indicators_missing: indicators.len() - total.used,
        })
        .collect();

    Ok(ScoreBoard { cells, aggregates })
}

fn validate(
    proposals: &[ProposalIndicatorMap],
    indicators: &[IndicatorDefinition],
    weights: &WeightConfig,
) -> Result<(), ScoringError> {
    if indicators.is_empty() {
        return Err(ScoringError::NoIndicators);
    }

    let mut seen = HashSet::with_capacity(indicators.len());
    for indicator in indicators {
        if !seen.insert(indicator.id.as_str()) {
            return Err(ScoringError::DuplicateIndicator(indicator.id.clone()));
        }
    }

    let mut seen = HashSet::with_capacity(proposals.len());
    for proposal in proposals {
        if !seen.insert(proposal.proposal_id.as_str()) {
            return Err(ScoringError::DuplicateProposal(proposal.proposal_id.clone()));
        }
    }

    weights.validate()
}
