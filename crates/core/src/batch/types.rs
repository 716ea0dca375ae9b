use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RankingConfig;
use crate::matcher::{CandidateStream, ExpectedMetadata, LookupStrategy};
use crate::searcher::RawTorrentResult;

/// Everything one batch needs, moved by value into the execution unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub results: Vec<RawTorrentResult>,
    pub expected: ExpectedMetadata,
    #[serde(default)]
    pub lookup: LookupStrategy,
    pub config: RankingConfig,
}

/// Lifecycle of a batch.
///
/// `Received -> PerItemProcessing -> Aggregated -> Delivered`, or
/// `Received -> Failed` on a whole-batch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStage {
    Received,
    PerItemProcessing,
    Aggregated,
    Delivered,
    Failed,
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStage::Received => "received",
            BatchStage::PerItemProcessing => "per_item_processing",
            BatchStage::Aggregated => "aggregated",
            BatchStage::Delivered => "delivered",
            BatchStage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Category of a whole-batch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The ranking config bundle did not validate.
    InvalidConfig,
    /// The worker thread could not be started.
    WorkerSpawn,
    /// The worker died or went away without answering.
    WorkerTerminated,
    /// The caller-side deadline passed.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidConfig => "invalid_config",
            FailureKind::WorkerSpawn => "worker_spawn",
            FailureKind::WorkerTerminated => "worker_terminated",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured failure of a whole batch.
///
/// Distinct from an empty successful result: a batch that ran and found
/// nothing is `Ok` with no candidates.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("batch failed ({kind}) during {stage} with {input_size} records: {message}")]
pub struct BatchFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Stage the batch was in when it failed.
    pub stage: BatchStage,
    /// Number of raw records in the failed batch.
    pub input_size: usize,
}

impl BatchFailure {
    pub fn new(
        kind: FailureKind,
        message: impl Into<String>,
        stage: BatchStage,
        input_size: usize,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            stage,
            input_size,
        }
    }
}

/// Per-batch counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub received: usize,
    /// Filtered out by the validator.
    pub rejected: usize,
    /// Dropped because processing the record failed.
    pub errored: usize,
    /// Dropped as later duplicates of an already admitted identifier.
    pub duplicates: usize,
    pub returned: usize,
    pub duration_ms: u64,
}

/// Successful outcome: ordered, deduplicated, capped candidates.
#[derive(Debug, Clone, Serialize)]
pub struct RankedBatch {
    pub candidates: Vec<CandidateStream>,
    pub stats: BatchStats,
}
