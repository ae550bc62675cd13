use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCell {
    pub proposal_id: String,
    pub indicator_id: String,
    pub raw_value: Option<f64>,
    pub normalized_value: Option<f64>,
    pub weighted_value: Option<f64>,
    pub is_best_in_class: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalAggregateScore {
    pub proposal_id: String,
    /// Weighted mean of the normalized values the proposal has data for; `None` when it
    /// has no data for any selected indicator.
    pub score: Option<f64>,
    pub indicators_used: usize,
    pub indicators_missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub proposal_id: String,
    pub score: Option<f64>,
}

/// Result of one scoring run: one cell per (indicator, proposal) pair in input order and
/// one aggregate per proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub cells: Vec<ScoreCell>,
    pub aggregates: Vec<ProposalAggregateScore>,
}

impl ScoreBoard {
    pub fn cell(&self, proposal_id: &str, indicator_id: &str) -> Option<&ScoreCell> {
        self.cells
            .iter()
            .find(|cell| cell.proposal_id == proposal_id && cell.indicator_id == indicator_id)
    }

    pub fn aggregate(&self, proposal_id: &str) -> Option<&ProposalAggregateScore> {
        self.aggregates
            .iter()
            .find(|aggregate| aggregate.proposal_id == proposal_id)
    }

    pub fn best_in_class(&self, indicator_id: &str) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|cell| cell.indicator_id == indicator_id && cell.is_best_in_class)
            .map(|cell| cell.proposal_id.as_str())
            .collect()
    }

    /// Proposals ordered by aggregate score, highest first. Equal scores share a rank;
    /// proposals without any data come last.
    pub fn ranking(&self) -> Vec<RankingEntry> {
        let mut ordered: Vec<&ProposalAggregateScore> = self.aggregates.iter().collect();
        ordered.sort_by(|a, b| {
            compare_scores(b.score, a.score).then_with(|| a.proposal_id.cmp(&b.proposal_id))
        });

        let mut entries: Vec<RankingEntry> = Vec::with_capacity(ordered.len());
        for (position, aggregate) in ordered.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(previous) if previous.score == aggregate.score => previous.rank,
                _ => position + 1,
            };
            entries.push(RankingEntry {
                rank,
                proposal_id: aggregate.proposal_id.clone(),
                score: aggregate.score,
            });
        }
        entries
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
