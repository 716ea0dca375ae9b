pub mod batch;
pub mod config;
pub mod matcher;
pub mod metrics;
pub mod searcher;
pub mod testing;

pub use batch::{
    create_executor, execute_with_timeout, process_batch, rank_or_empty, BatchExecutor,
    BatchFailure, BatchRequest, BatchStage, BatchStats, FailureKind, InlineExecutor, RankedBatch,
    WorkerExecutor,
};
pub use config::{
    load_config, load_config_from_str, validate_config, validate_ranking_config, Config,
    ConfigError, RankingConfig, SanitizedConfig, ServerConfig, SortKey, WorkerConfig, WorkerMode,
};
pub use matcher::{
    normalize_title, CandidateStream, ContentKind, ExpectedMetadata, LookupStrategy,
    NormalizedTitle, ParsedAttributes, RelevanceValidator, Resolution,
};
pub use searcher::{RawTorrentResult, RecordError};
