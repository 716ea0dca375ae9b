//! The ranking pipeline for one batch.
//!
//! Per record: identifier, attributes, relevance, candidate. Then first-seen
//! dedup, ordering and the result cap. Each record runs inside its own fault
//! boundary so one bad record never takes the batch down.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{validate_ranking_config, RankingConfig};
use crate::matcher::{
    is_preferred_language, quality_rank, resolve_attributes, sort_and_truncate, CandidateStream,
    RankingScorer, RejectReason, RelevanceValidator, Verdict,
};
use crate::metrics;
use crate::searcher::{
    build_magnet_uri, deduplicate_first_seen, derive_info_hash, parse_publish_date,
    RawTorrentResult, RecordError,
};

use super::types::{BatchFailure, BatchRequest, BatchStage, BatchStats, FailureKind, RankedBatch};

/// Outcome of one record that did not fault.
enum RecordOutcome {
    Accepted(Box<CandidateStream>),
    Rejected(RejectReason),
}

/// Per-batch state shared by every record.
struct RecordContext<'a> {
    validator: RelevanceValidator<'a>,
    scorer: RankingScorer,
    config: &'a RankingConfig,
}

/// Run the whole pipeline over one batch, synchronously.
///
/// Fails only when the ranking config is invalid; per-record faults are
/// logged and the record is dropped.
pub fn process_batch(request: BatchRequest) -> Result<RankedBatch, BatchFailure> {
    let started = Instant::now();
    let batch_id = Uuid::new_v4();
    let input_size = request.results.len();

    let span = info_span!("rank_batch", %batch_id, records = input_size);
    let _guard = span.enter();

    debug!(stage = %BatchStage::Received, lookup = ?request.lookup, "Batch received");

    if let Err(e) = validate_ranking_config(&request.config) {
        error!(stage = %BatchStage::Failed, error = %e, "Rejecting batch: invalid ranking config");
        metrics::BATCHES_TOTAL
            .with_label_values(&[FailureKind::InvalidConfig.as_str()])
            .inc();
        return Err(BatchFailure::new(
            FailureKind::InvalidConfig,
            e.to_string(),
            BatchStage::Received,
            input_size,
        ));
    }

    metrics::BATCH_SIZE
        .with_label_values(&[])
        .observe(input_size as f64);

    let BatchRequest {
        results,
        expected,
        lookup,
        config,
    } = request;

    let ctx = RecordContext {
        validator: RelevanceValidator::new(&expected, lookup, &config),
        scorer: RankingScorer::new(&expected),
        config: &config,
    };

    let mut stats = BatchStats {
        received: input_size,
        ..Default::default()
    };

    debug!(stage = %BatchStage::PerItemProcessing, "Processing records");
    let mut accepted = Vec::with_capacity(results.len());
    for raw in &results {
        match catch_unwind(AssertUnwindSafe(|| process_record(raw, &ctx))) {
            Ok(Ok(RecordOutcome::Accepted(candidate))) => accepted.push(*candidate),
            Ok(Ok(RecordOutcome::Rejected(reason))) => {
                debug!(title = %raw.title_or_empty(), %reason, "Rejected record");
                stats.rejected += 1;
            }
            Ok(Err(e)) => {
                warn!(title = ?raw.title, error = %e, "Dropping malformed record");
                stats.errored += 1;
            }
            Err(payload) => {
                warn!(
                    title = ?raw.title,
                    error = %panic_message(payload.as_ref()),
                    "Record processing panicked, dropping record"
                );
                stats.errored += 1;
            }
        }
    }

    debug!(stage = %BatchStage::Aggregated, accepted = accepted.len(), "Aggregating");
    let (unique, duplicates) = deduplicate_first_seen(accepted, |c| c.info_hash.as_str());
    stats.duplicates = duplicates;

    let candidates = sort_and_truncate(unique, &config);
    stats.returned = candidates.len();
    stats.duration_ms = started.elapsed().as_millis() as u64;

    record_outcomes(&stats);
    metrics::BATCHES_TOTAL.with_label_values(&["success"]).inc();

    info!(
        stage = %BatchStage::Delivered,
        received = stats.received,
        rejected = stats.rejected,
        errored = stats.errored,
        duplicates = stats.duplicates,
        returned = stats.returned,
        duration_ms = stats.duration_ms,
        "Batch ranked"
    );

    Ok(RankedBatch { candidates, stats })
}

/// Title that makes [`process_record`] panic in unit tests.
#[cfg(test)]
const PANIC_TITLE: &str = "panic.in.record";

fn process_record(
    raw: &RawTorrentResult,
    ctx: &RecordContext<'_>,
) -> Result<RecordOutcome, RecordError> {
    #[cfg(test)]
    if raw.title.as_deref() == Some(PANIC_TITLE) {
        panic!("record fault injected");
    }

    let Some(info_hash) = derive_info_hash(raw)? else {
        return Ok(RecordOutcome::Rejected(RejectReason::NoIdentifier));
    };
    let title = raw.title.as_deref().ok_or(RecordError::MissingTitle)?;

    let attributes = resolve_attributes(raw, ctx.config);
    if let Verdict::Reject(reason) = ctx.validator.validate(raw, &attributes) {
        return Ok(RecordOutcome::Rejected(reason));
    }

    let config = ctx.config;
    let candidate = CandidateStream {
        title: title.to_string(),
        magnet_uri: build_magnet_uri(&info_hash, title, &config.trackers),
        info_hash,
        indexer: raw.indexer.clone(),
        size_bytes: raw.size_bytes,
        seeders: raw.seeders,
        leechers: raw.leechers,
        publish_date: raw.publish_date.as_deref().and_then(parse_publish_date),
        resolution_rank: attributes.resolution.rank(),
        video_rank: quality_rank(
            attributes.video_quality.as_deref(),
            &config.preferred_video_qualities,
        ),
        audio_rank: quality_rank(
            attributes.audio_quality.as_deref(),
            &config.preferred_audio_qualities,
        ),
        score: ctx.scorer.score(raw),
        preferred_language: is_preferred_language(
            attributes.language.as_deref(),
            &config.preferred_languages,
        ),
        attributes,
    };

    Ok(RecordOutcome::Accepted(Box::new(candidate)))
}

fn record_outcomes(stats: &BatchStats) {
    let accepted = stats.received - stats.rejected - stats.errored - stats.duplicates;
    for (outcome, count) in [
        ("accepted", accepted),
        ("rejected", stats.rejected),
        ("error", stats.errored),
        ("duplicate", stats.duplicates),
    ] {
        metrics::RECORDS_TOTAL
            .with_label_values(&[outcome])
            .inc_by(count as u64);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ExpectedMetadata;
    use crate::testing::fixtures::{
        batch_request, hash_label, info_hash, raw_result, raw_result_with_magnet,
    };

    fn matrix() -> ExpectedMetadata {
        ExpectedMetadata::movie("The Matrix", Some(1999))
    }

    #[test]
    fn test_process_batch_builds_candidates() {
        let mut raw = raw_result("The.Matrix.1999.1080p.BluRay.x264-GROUP", "ABC123");
        raw.publish_date = Some("2021-03-04T05:06:07Z".to_string());
        let mut request = batch_request(matrix(), vec![raw]);
        request.config.trackers = vec!["udp://tracker.example:1337".to_string()];

        let batch = process_batch(request).unwrap();

        assert_eq!(batch.candidates.len(), 1);
        let c = &batch.candidates[0];
        let expected_hash = info_hash("abc123");
        assert_eq!(c.info_hash, expected_hash);
        assert!(c
            .magnet_uri
            .starts_with(&format!("magnet:?xt=urn:btih:{}&dn=", expected_hash)));
        assert!(c.magnet_uri.contains("&tr=udp%3A%2F%2Ftracker.example%3A1337"));
        assert_eq!(c.attributes.resolution.label(), Some("1080p"));
        assert_eq!(c.attributes.video_quality.as_deref(), Some("bluray"));
        assert_eq!(c.resolution_rank, 3);
        assert!(c.publish_date.is_some());
        assert_eq!(c.score, 101.0);
    }

    #[test]
    fn test_process_batch_counts_outcomes() {
        let mut null_title = raw_result("", "fff000");
        null_title.title = None;
        let mut no_hash = raw_result("The Matrix 1999", "x");
        no_hash.info_hash = None;

        let results = vec![
            raw_result("The.Matrix.1999.720p", "aaa111"),
            raw_result("Heat 1995", "bbb222"),
            null_title,
            no_hash,
            raw_result("The.Matrix.1999.1080p", "AAA111"),
            raw_result_with_magnet("The.Matrix.1999.2160p", "ccc333"),
        ];

        let batch = process_batch(batch_request(matrix(), results)).unwrap();

        assert_eq!(
            batch.stats,
            BatchStats {
                received: 6,
                rejected: 2,
                errored: 1,
                duplicates: 1,
                returned: 2,
                duration_ms: batch.stats.duration_ms,
            }
        );
        let hashes: Vec<String> = batch.candidates.iter().map(|c| hash_label(&c.info_hash)).collect();
        // the 720p record was seen first, so its 1080p duplicate is gone
        assert_eq!(hashes, vec!["ccc333", "aaa111"]);
        assert_eq!(batch.candidates[1].attributes.resolution.label(), Some("720p"));
    }

    #[test]
    fn test_process_batch_malformed_identifier_is_dropped() {
        let mut bad_chars = raw_result("The.Matrix.1999.720p", "x");
        bad_chars.info_hash = Some("not-a-hash!".to_string());
        let mut short = raw_result("The.Matrix.1999.2160p", "y");
        short.info_hash = Some("abc123".to_string());

        let results = vec![
            bad_chars,
            short,
            raw_result("The.Matrix.1999.1080p", "abc123"),
        ];
        let batch = process_batch(batch_request(matrix(), results)).unwrap();
        assert_eq!(batch.stats.errored, 2);
        assert_eq!(batch.candidates.len(), 1);
    }

    #[test]
    fn test_process_batch_hex_and_base32_are_one_candidate() {
        let mut hex_form = raw_result("The.Matrix.1999.1080p", "x");
        hex_form.info_hash = Some("6162636465666768696A6B6C6D6E6F7071727374".to_string());
        let mut base32_form = raw_result("The.Matrix.1999.720p", "y");
        base32_form.info_hash = None;
        base32_form.magnet_uri =
            Some("magnet:?xt=urn:btih:MFRGGZDFMZTWQ2LKNNWG23TPOBYXE43U&dn=x".to_string());

        let batch = process_batch(batch_request(matrix(), vec![base32_form, hex_form])).unwrap();

        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(batch.stats.duplicates, 1);
        let c = &batch.candidates[0];
        assert_eq!(c.info_hash, "6162636465666768696a6b6c6d6e6f7071727374");
        assert_eq!(c.attributes.resolution.label(), Some("720p"));
    }

    #[test]
    fn test_process_batch_survives_record_panic() {
        let results = vec![
            raw_result("The.Matrix.1999.720p", "aaa111"),
            raw_result(PANIC_TITLE, "bbb222"),
            raw_result("The.Matrix.1999.1080p", "ccc333"),
        ];

        let batch = process_batch(batch_request(matrix(), results)).unwrap();

        assert_eq!(batch.candidates.len(), 2);
        assert_eq!(batch.stats.errored, 1);
        assert_eq!(batch.stats.rejected, 0);
        assert_eq!(batch.stats.returned, 2);
    }

    #[test]
    fn test_process_batch_invalid_config_fails() {
        let mut request = batch_request(matrix(), vec![raw_result("The Matrix", "abc123")]);
        request.config.max_result_count = 0;

        let failure = process_batch(request).unwrap_err();

        assert_eq!(failure.kind, FailureKind::InvalidConfig);
        assert_eq!(failure.stage, BatchStage::Received);
        assert_eq!(failure.input_size, 1);
        assert!(failure.message.contains("max_result_count"));
    }

    #[test]
    fn test_process_batch_empty_is_success() {
        let batch = process_batch(batch_request(matrix(), Vec::new())).unwrap();
        assert!(batch.candidates.is_empty());
        assert_eq!(batch.stats.received, 0);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
