//! Side-by-side comparison of competing design proposals.
//!
//! Documents are reduced to one value per registered indicator by [`PatternExtractor`],
//! stray table labels are resolved with [`FuzzyMatcher`], and the resulting maps are ranked
//! by [`score`] on a shared 0-100 scale.

pub mod domain;
pub mod extractor;
pub mod matcher;
pub mod normalizer;
pub mod registry;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sheet;

pub use domain::{
    Confidence, ExtractedValue, ExtractionRule, IndicatorDefinition, NumberCapture,
    ProposalIndicatorMap, NOT_FOUND_EVIDENCE,
};
pub use extractor::{extract, PatternExtractor};
pub use matcher::{similarity, FuzzyMatcher, IndicatorMatch, DEFAULT_MATCH_THRESHOLD};
pub use normalizer::normalize_label;
pub use registry::{
    FallbackSlots, IndicatorRegistry, RegistryDocument, RegistryError, ResidualRule,
};
pub use router::comparison_router;
pub use scoring::{
    score, share_of_maximum, ProposalAggregateScore, RankingEntry, ScoreBoard, ScoreCell,
    ScoringError, ShareOfMaximum, WeightConfig, NEUTRAL_WEIGHT_PERCENT,
};
pub use service::{
    ComparisonReport, ComparisonService, ComparisonServiceError, LabelMatch, ProposalDocument,
    ReviewFlag,
};
pub use sheet::{ProposalSheet, ProposalSheetImporter, SheetImportError};
