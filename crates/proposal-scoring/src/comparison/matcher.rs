use super::normalizer::normalize_label;
use super::registry::IndicatorRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

const TOTAL_TOKENS: &[&str] = &["total", "celkem", "celkova", "celkovy", "suma", "soucet", "sum"];
const GROUP_WORDS: &[&str] = &[
    "indicators",
    "indicator",
    "ukazatele",
    "ukazatelu",
    "category",
    "kategorie",
    "summary",
    "souhrn",
    "bilance",
];

/// Best registry candidate for a free-text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMatch {
    pub indicator_id: String,
    pub score: f64,
    pub synonym: String,
}

struct Candidate {
    indicator_id: String,
    original: String,
    normalized: String,
}

/// Resolves labels that arrive without registry ids to the best matching indicator.
pub struct FuzzyMatcher {
    candidates: Vec<Candidate>,
    group_words: Vec<String>,
    threshold: f64,
}

impl FuzzyMatcher {
    pub fn new(registry: &IndicatorRegistry) -> Self {
        Self::with_threshold(registry, DEFAULT_MATCH_THRESHOLD)
    }

    pub fn with_threshold(registry: &IndicatorRegistry, threshold: f64) -> Self {
        let mut candidates = Vec::new();
        for indicator in registry.indicators() {
            for original in std::iter::once(&indicator.name).chain(indicator.synonyms.iter()) {
                let normalized = normalize_label(original);
                if normalized.is_empty() {
                    continue;
                }
                candidates.push(Candidate {
                    indicator_id: indicator.id.clone(),
                    original: original.clone(),
                    normalized,
                });
            }
        }

        let mut group_words: Vec<String> = GROUP_WORDS.iter().map(|w| w.to_string()).collect();
        for category in registry.categories() {
            for word in normalize_label(category).split(' ') {
                if !word.is_empty() && !group_words.iter().any(|known| known == word) {
                    group_words.push(word.to_string());
                }
            }
        }

        Self {
            candidates,
            group_words,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Global best match across every synonym of every indicator, accepted only above the
    /// threshold. Rollup rows such as "celkem ukazatele" never match.
    pub fn match_one(&self, label: &str) -> Option<IndicatorMatch> {
        let normalized = normalize_label(label);
        if normalized.is_empty() || self.is_rollup(&normalized) {
            return None;
        }

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in &self.candidates {
            let score = similarity(&normalized, &candidate.normalized);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        let (candidate, score) = best?;
        if score > self.threshold {
            Some(IndicatorMatch {
                indicator_id: candidate.indicator_id.clone(),
                score,
                synonym: candidate.original.clone(),
            })
        } else {
            debug!(label, score, "label below match threshold");
            None
        }
    }

    /// Matches many labels at once, keeping the strongest label per indicator.
    pub fn match_batch<S: AsRef<str>>(&self, labels: &[S]) -> BTreeMap<String, String> {
        self.match_batch_scored(labels)
            .into_iter()
            .map(|(id, (label, _))| (id, label))
            .collect()
    }

    pub(crate) fn match_batch_scored<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> BTreeMap<String, (String, IndicatorMatch)> {
        let mut accepted: BTreeMap<String, (String, IndicatorMatch)> = BTreeMap::new();
        for label in labels {
            let label = label.as_ref();
            let Some(found) = self.match_one(label) else {
                continue;
            };
            match accepted.get(&found.indicator_id) {
                Some((_, existing)) if existing.score >= found.score => {}
                _ => {
                    accepted.insert(found.indicator_id.clone(), (label.to_string(), found));
                }
            }
        }
        accepted
    }

    /// Aggregate rows combine a "total" token with a generic group or category word.
    pub fn is_rollup_label(&self, label: &str) -> bool {
        self.is_rollup(&normalize_label(label))
    }

    fn is_rollup(&self, normalized: &str) -> bool {
        let tokens: Vec<&str> = normalized.split(' ').collect();
        let has_total = tokens.iter().any(|token| TOTAL_TOKENS.contains(token));
        has_total
            && tokens
                .iter()
                .any(|token| self.group_words.iter().any(|word| word == token))
    }
}

/// `(maxLen - levenshtein) / maxLen` over characters; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}
