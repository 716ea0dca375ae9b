use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Primary key for the final ordering of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Relevance score from the scorer.
    Score,
    /// Declared seed count.
    #[default]
    Seeders,
    /// Declared publish date, newest first.
    PublishDate,
}

/// User preferences and thresholds applied to one ranking batch.
///
/// Passed by value into every batch; never mutated while a batch runs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Records with fewer declared seeders are filtered out.
    #[serde(default)]
    pub min_seeders: u32,
    /// Minimum declared size in MB (records with unknown size pass).
    #[serde(default)]
    pub min_size_mb: f64,
    /// Maximum declared size in MB. `None` = unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<f64>,
    /// Resolution allow-list (e.g. "1080p", "2160p"). Empty = allow all.
    #[serde(default)]
    pub allowed_resolutions: Vec<String>,
    /// Language allow-list. Empty = allow all.
    #[serde(default)]
    pub allowed_languages: Vec<String>,
    /// Languages that win ties in the final ordering.
    #[serde(default)]
    pub preferred_languages: Vec<String>,
    /// Video quality tags, best first.
    #[serde(default)]
    pub preferred_video_qualities: Vec<String>,
    /// Audio quality tags, best first.
    #[serde(default)]
    pub preferred_audio_qualities: Vec<String>,
    /// Maximum number of candidates returned, applied after sorting.
    #[serde(default = "default_max_result_count")]
    pub max_result_count: usize,
    /// Most significant key of the final ordering.
    #[serde(default)]
    pub primary_sort_key: SortKey,
    /// Trackers appended to every constructed magnet URI.
    #[serde(default)]
    pub trackers: Vec<String>,
}

fn default_max_result_count() -> usize {
    20
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_seeders: 0,
            min_size_mb: 0.0,
            max_size_mb: None,
            allowed_resolutions: Vec::new(),
            allowed_languages: Vec::new(),
            preferred_languages: Vec::new(),
            preferred_video_qualities: Vec::new(),
            preferred_audio_qualities: Vec::new(),
            max_result_count: default_max_result_count(),
            primary_sort_key: SortKey::default(),
            trackers: Vec::new(),
        }
    }
}

/// Where a batch is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMode {
    /// Run on the calling task.
    Inline,
    /// Spawn a dedicated thread per batch.
    #[default]
    Thread,
}

/// Batch execution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub mode: WorkerMode,
    /// Caller-side timeout around a whole batch (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: WorkerMode::default(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Sanitized config for API responses (tracker URLs may embed passkeys)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub ranking: SanitizedRankingConfig,
    pub worker: WorkerConfig,
}

/// Ranking config with the tracker list replaced by a count
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRankingConfig {
    pub min_seeders: u32,
    pub min_size_mb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<f64>,
    pub allowed_resolutions: Vec<String>,
    pub allowed_languages: Vec<String>,
    pub preferred_languages: Vec<String>,
    pub preferred_video_qualities: Vec<String>,
    pub preferred_audio_qualities: Vec<String>,
    pub max_result_count: usize,
    pub primary_sort_key: SortKey,
    pub trackers_configured: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let ranking = &config.ranking;
        Self {
            server: config.server.clone(),
            ranking: SanitizedRankingConfig {
                min_seeders: ranking.min_seeders,
                min_size_mb: ranking.min_size_mb,
                max_size_mb: ranking.max_size_mb,
                allowed_resolutions: ranking.allowed_resolutions.clone(),
                allowed_languages: ranking.allowed_languages.clone(),
                preferred_languages: ranking.preferred_languages.clone(),
                preferred_video_qualities: ranking.preferred_video_qualities.clone(),
                preferred_audio_qualities: ranking.preferred_audio_qualities.clone(),
                max_result_count: ranking.max_result_count,
                primary_sort_key: ranking.primary_sort_key,
                trackers_configured: ranking.trackers.len(),
            },
            worker: config.worker.clone(),
        }
    }
}
