//! Result matching and ranking.
//!
//! Normalizes release titles, extracts attributes, decides relevance against
//! the expected metadata, scores and orders the survivors.

mod attributes;
mod normalize;
mod ordering;
mod relevance;
mod scorer;
mod types;
mod vocabulary;

pub use attributes::{
    detect_language, extract_attributes, extract_audio_quality, extract_resolution,
    extract_video_quality, quality_rank, resolve_attributes,
};
pub use normalize::normalize_title;
pub use ordering::{compare_candidates, sort_and_truncate};
pub use relevance::{is_preferred_language, RejectReason, RelevanceValidator, Verdict};
pub use scorer::{score_result, RankingScorer, ScoreWeights};
pub use types::*;
