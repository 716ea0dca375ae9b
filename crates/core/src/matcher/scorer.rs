//! Additive relevance scoring.
//!
//! Scores a raw record against the expected metadata with a fixed point
//! model. Used as the primary sort key when configured, and always reported.

use crate::searcher::RawTorrentResult;

use super::normalize::{contains_title, normalize_title};
use super::types::{ExpectedMetadata, NormalizedTitle};

/// Points awarded by the scorer.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    /// Title match with year agreement.
    pub title_with_year: f64,
    /// Title match alone.
    pub title_only: f64,
    /// Alternate title match with year agreement (per alternate).
    pub alternate_with_year: f64,
    /// Alternate title match alone (per alternate).
    pub alternate_only: f64,
    /// Canonical identifier found in the raw title.
    pub canonical_id: f64,
    /// Penalty for a year disagreement when some title matched.
    pub year_mismatch_penalty: f64,
    /// Cap of the seeder nudge.
    pub max_seed_bonus: f64,
    /// Seeders per bonus point.
    pub seeders_per_point: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title_with_year: 100.0,
            title_only: 50.0,
            alternate_with_year: 40.0,
            alternate_only: 20.0,
            canonical_id: 15.0,
            year_mismatch_penalty: 30.0,
            max_seed_bonus: 5.0,
            seeders_per_point: 10.0,
        }
    }
}

/// Scorer bound to one expected-metadata value.
///
/// Normalizes the expected and alternate titles once, up front.
pub struct RankingScorer {
    weights: ScoreWeights,
    expected_year: Option<u16>,
    title: Option<NormalizedTitle>,
    alternates: Vec<NormalizedTitle>,
    canonical_id: Option<String>,
}

impl RankingScorer {
    pub fn new(expected: &ExpectedMetadata) -> Self {
        Self::with_weights(expected, ScoreWeights::default())
    }

    pub fn with_weights(expected: &ExpectedMetadata, weights: ScoreWeights) -> Self {
        Self {
            weights,
            expected_year: expected.year,
            title: expected.title.as_deref().map(normalize_title),
            alternates: expected
                .alternate_titles
                .iter()
                .map(|t| normalize_title(t))
                .filter(|n| !n.text.is_empty())
                .collect(),
            canonical_id: expected.canonical_id_lower(),
        }
    }

    /// Score a raw record. Always `>= 0`; pure in its inputs.
    pub fn score(&self, raw: &RawTorrentResult) -> f64 {
        let w = &self.weights;
        let raw_title = raw.title_or_empty();
        let normalized = normalize_title(raw_title);

        let year_agrees = matches!(
            (self.expected_year, normalized.year),
            (Some(want), Some(got)) if want == got
        );
        let year_disagrees = matches!(
            (self.expected_year, normalized.year),
            (Some(want), Some(got)) if want != got
        );

        let mut score = 0.0;
        let mut title_overlap = false;

        if let Some(title) = &self.title {
            if contains_title(&normalized.text, &title.text) {
                title_overlap = true;
                score += if year_agrees { w.title_with_year } else { w.title_only };
            }
        }

        for alternate in &self.alternates {
            if contains_title(&normalized.text, &alternate.text) {
                title_overlap = true;
                score += if year_agrees {
                    w.alternate_with_year
                } else {
                    w.alternate_only
                };
            }
        }

        if let Some(id) = &self.canonical_id {
            if raw_title.to_lowercase().contains(id.as_str()) {
                score += w.canonical_id;
            }
        }

        if year_disagrees && title_overlap {
            score -= w.year_mismatch_penalty;
        }

        score += (raw.seeders as f64 / w.seeders_per_point).min(w.max_seed_bonus);

        score.max(0.0)
    }
}

/// One-off score of a record against expected metadata.
pub fn score_result(raw: &RawTorrentResult, expected: &ExpectedMetadata) -> f64 {
    RankingScorer::new(expected).score(raw)
}
