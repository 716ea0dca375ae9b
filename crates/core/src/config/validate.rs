use super::{
    types::{Config, RankingConfig},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Worker timeout is not 0
/// - The ranking bundle (see [`validate_ranking_config`])
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.worker.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "worker.timeout_secs cannot be 0".to_string(),
        ));
    }

    validate_ranking_config(&config.ranking)
}

/// Validate a ranking bundle.
///
/// Also run at the start of every batch: a bundle that fails here makes the
/// whole batch fail before any record is looked at.
pub fn validate_ranking_config(ranking: &RankingConfig) -> Result<(), ConfigError> {
    if ranking.max_result_count == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.max_result_count must be at least 1".to_string(),
        ));
    }

    if !ranking.min_size_mb.is_finite() || ranking.min_size_mb < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "ranking.min_size_mb must be a non-negative number, got {}",
            ranking.min_size_mb
        )));
    }

    if let Some(max) = ranking.max_size_mb {
        if !max.is_finite() || max < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "ranking.max_size_mb must be a non-negative number, got {}",
                max
            )));
        }
        if max < ranking.min_size_mb {
            return Err(ConfigError::ValidationError(format!(
                "ranking.max_size_mb ({}) is smaller than ranking.min_size_mb ({})",
                max, ranking.min_size_mb
            )));
        }
    }

    let lists = [
        ("allowed_resolutions", &ranking.allowed_resolutions),
        ("allowed_languages", &ranking.allowed_languages),
        ("preferred_languages", &ranking.preferred_languages),
        ("preferred_video_qualities", &ranking.preferred_video_qualities),
        ("preferred_audio_qualities", &ranking.preferred_audio_qualities),
        ("trackers", &ranking.trackers),
    ];
    for (name, values) in lists {
        if values.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "ranking.{} contains an empty entry",
                name
            )));
        }
    }

    Ok(())
}
