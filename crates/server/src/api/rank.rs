use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use streamsift_core::{
    execute_with_timeout, BatchFailure, BatchRequest, BatchStage, BatchStats, CandidateStream,
    ExpectedMetadata, FailureKind, LookupStrategy, RawTorrentResult,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    /// What the caller is looking for.
    pub expected: ExpectedMetadata,
    /// Raw indexer results, in the order they were received.
    #[serde(default)]
    pub results: Vec<RawTorrentResult>,
    /// How the indexer lookup was keyed.
    #[serde(default)]
    pub lookup: LookupStrategy,
    /// Extra trackers appended to the configured ones.
    #[serde(default)]
    pub trackers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub candidates: Vec<CandidateStream>,
    pub stats: BatchStats,
}

#[derive(Debug, Serialize)]
pub struct RankErrorResponse {
    pub error: String,
    pub stage: BatchStage,
    pub kind: FailureKind,
    pub input_size: usize,
}

impl From<BatchFailure> for RankErrorResponse {
    fn from(failure: BatchFailure) -> Self {
        Self {
            error: failure.message,
            stage: failure.stage,
            kind: failure.kind,
            input_size: failure.input_size,
        }
    }
}

fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidConfig => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::WorkerSpawn | FailureKind::WorkerTerminated => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/rank
///
/// Filter, deduplicate and order one batch of raw indexer results.
pub async fn rank(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RankRequest>,
) -> Result<Json<RankResponse>, impl IntoResponse> {
    let mut config = state.ranking().clone();
    config.trackers.extend(body.trackers);

    let request = BatchRequest {
        results: body.results,
        expected: body.expected,
        lookup: body.lookup,
        config,
    };

    match execute_with_timeout(state.executor(), request, state.batch_timeout()).await {
        Ok(batch) => {
            info!(
                executor = state.executor().name(),
                received = batch.stats.received,
                returned = batch.stats.returned,
                "Ranked batch"
            );
            Ok(Json(RankResponse {
                candidates: batch.candidates,
                stats: batch.stats,
            }))
        }
        Err(failure) => {
            warn!(
                kind = %failure.kind,
                stage = %failure.stage,
                input_size = failure.input_size,
                error = %failure.message,
                "Rank request failed"
            );
            Err((
                failure_status(failure.kind),
                Json(RankErrorResponse::from(failure)),
            ))
        }
    }
}
