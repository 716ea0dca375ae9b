//! Final multi-key ordering of candidates.

use std::cmp::Ordering;

use crate::config::{RankingConfig, SortKey};

use super::types::CandidateStream;

/// Compare two candidates, best first.
///
/// Keys, most significant first: the configured primary key, publish date,
/// preferred language, resolution rank, video rank, audio rank, seeders.
pub fn compare_candidates(a: &CandidateStream, b: &CandidateStream, primary: SortKey) -> Ordering {
    let primary_order = match primary {
        SortKey::Score => b.score.total_cmp(&a.score),
        SortKey::Seeders => b.seeders.cmp(&a.seeders),
        SortKey::PublishDate => b.publish_timestamp().cmp(&a.publish_timestamp()),
    };

    primary_order
        .then_with(|| b.publish_timestamp().cmp(&a.publish_timestamp()))
        .then_with(|| b.preferred_language.cmp(&a.preferred_language))
        .then_with(|| b.resolution_rank.cmp(&a.resolution_rank))
        .then_with(|| b.video_rank.cmp(&a.video_rank))
        .then_with(|| b.audio_rank.cmp(&a.audio_rank))
        .then_with(|| b.seeders.cmp(&a.seeders))
}

/// Sort (stable) and only then cap to `max_result_count`.
pub fn sort_and_truncate(mut candidates: Vec<CandidateStream>, ranking: &RankingConfig) -> Vec<CandidateStream> {
    candidates.sort_by(|a, b| compare_candidates(a, b, ranking.primary_sort_key));
    candidates.truncate(ranking.max_result_count);
    candidates
}
