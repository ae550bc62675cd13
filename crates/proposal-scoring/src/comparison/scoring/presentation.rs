use crate::comparison::domain::{IndicatorDefinition, ProposalIndicatorMap};
use serde::{Deserialize, Serialize};

/// Radar-chart scale: each value as a share of the best value observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareOfMaximum {
    pub proposal_id: String,
    pub indicator_id: String,
    pub share: Option<f64>,
}

/// Presentation transform applied next to the canonical min-max scores, never in their
/// place. Higher-is-better indicators use `value / max`, lower-is-better ones `min / value`.
/// Only non-negative values have a share.
pub fn share_of_maximum(
    proposals: &[ProposalIndicatorMap],
    indicators: &[IndicatorDefinition],
) -> Vec<ShareOfMaximum> {
    let mut shares = Vec::with_capacity(proposals.len() * indicators.len());

    for indicator in indicators {
        let present = || {
            proposals
                .iter()
                .filter_map(|proposal| proposal.raw_value(&indicator.id))
                .filter(|value| *value >= 0.0)
        };
        let max = present().fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
        let min = present().fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))));

        for proposal in proposals {
            let share = proposal
                .raw_value(&indicator.id)
                .filter(|value| *value >= 0.0)
                .and_then(|value| {
                    if indicator.lower_is_better {
                        let min = min?;
                        if value == 0.0 {
                            Some(100.0)
                        } else {
                            Some(min / value * 100.0)
                        }
                    } else {
                        let max = max?;
                        if max == 0.0 {
                            Some(100.0)
                        } else {
                            Some(value / max * 100.0)
                        }
                    }
                });

            shares.push(ShareOfMaximum {
                proposal_id: proposal.proposal_id.clone(),
                indicator_id: indicator.id.clone(),
                share,
            });
        }
    }

    shares
}
