//! Relevance validation: is a raw record about the requested title?

use std::fmt;

use serde::Serialize;

use crate::config::RankingConfig;
use crate::searcher::{derive_info_hash, RawTorrentResult};

use super::attributes::resolve_attributes;
use super::normalize::{contains_title, has_episode_marker, normalize_title};
use super::types::{ContentKind, ExpectedMetadata, LookupStrategy, NormalizedTitle, ParsedAttributes, Resolution};

/// Why a record was filtered out. Rejections are normal outcomes, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoIdentifier,
    MissingExpectedTitle,
    TitleMismatch,
    YearMismatch,
    EpisodeMismatch,
    TooFewSeeders,
    SizeOutOfRange,
    ResolutionNotAllowed,
    LanguageNotAllowed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::NoIdentifier => "no content identifier",
            RejectReason::MissingExpectedTitle => "no expected title",
            RejectReason::TitleMismatch => "title mismatch",
            RejectReason::YearMismatch => "year mismatch",
            RejectReason::EpisodeMismatch => "episode mismatch",
            RejectReason::TooFewSeeders => "too few seeders",
            RejectReason::SizeOutOfRange => "size out of range",
            RejectReason::ResolutionNotAllowed => "resolution not allowed",
            RejectReason::LanguageNotAllowed => "language not allowed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Validator for one batch: expected metadata, lookup strategy and
/// preference filters are fixed when it is built.
pub struct RelevanceValidator<'a> {
    expected: &'a ExpectedMetadata,
    expected_title: Option<NormalizedTitle>,
    canonical_id: Option<String>,
    lookup: LookupStrategy,
    ranking: &'a RankingConfig,
}

impl<'a> RelevanceValidator<'a> {
    pub fn new(
        expected: &'a ExpectedMetadata,
        lookup: LookupStrategy,
        ranking: &'a RankingConfig,
    ) -> Self {
        let expected_title = expected.title.as_deref().map(normalize_title);
        Self {
            expected,
            expected_title,
            canonical_id: expected.canonical_id_lower(),
            lookup,
            ranking,
        }
    }

    /// Full check of a raw record, deriving its identifier and attributes.
    pub fn is_relevant(&self, raw: &RawTorrentResult) -> bool {
        match derive_info_hash(raw) {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return false,
        }
        let attributes = resolve_attributes(raw, self.ranking);
        self.validate(raw, &attributes).is_accept()
    }

    /// Check a record whose identifier is already known to exist.
    ///
    /// `attributes` must come from [`resolve_attributes`] with the same config.
    pub fn validate(&self, raw: &RawTorrentResult, attributes: &ParsedAttributes) -> Verdict {
        let Some(expected_title) = &self.expected_title else {
            return Verdict::Reject(RejectReason::MissingExpectedTitle);
        };
        if expected_title.text.is_empty() {
            return Verdict::Reject(RejectReason::MissingExpectedTitle);
        }

        let raw_title = raw.title_or_empty();

        if !self.matches_identifier(raw_title) {
            let normalized = normalize_title(raw_title);
            if !contains_title(&normalized.text, &expected_title.text) {
                return Verdict::Reject(RejectReason::TitleMismatch);
            }
            if self.expected.kind == ContentKind::Movie {
                if let (Some(want), Some(got)) = (self.expected.year, normalized.year) {
                    if want != got {
                        return Verdict::Reject(RejectReason::YearMismatch);
                    }
                }
            }
        }

        if self.expected.kind == ContentKind::Series {
            if let (Some(season), Some(episode)) = (self.expected.season, self.expected.episode) {
                if !has_episode_marker(raw_title, season, episode) {
                    return Verdict::Reject(RejectReason::EpisodeMismatch);
                }
            }
        }

        self.check_preferences(raw, attributes)
    }

    /// Identifier-seeded lookups accept titles that embed the canonical id.
    fn matches_identifier(&self, raw_title: &str) -> bool {
        match (self.lookup, &self.canonical_id) {
            (LookupStrategy::IdentifierSeeded, Some(id)) => raw_title.to_lowercase().contains(id),
            _ => false,
        }
    }

    fn check_preferences(&self, raw: &RawTorrentResult, attributes: &ParsedAttributes) -> Verdict {
        let ranking = self.ranking;

        if raw.seeders < ranking.min_seeders {
            return Verdict::Reject(RejectReason::TooFewSeeders);
        }

        // 0 means the indexer did not report a size.
        if raw.size_bytes > 0 {
            let size_mb = raw.size_bytes as f64 / BYTES_PER_MB;
            if size_mb < ranking.min_size_mb {
                return Verdict::Reject(RejectReason::SizeOutOfRange);
            }
            if ranking.max_size_mb.is_some_and(|max| size_mb > max) {
                return Verdict::Reject(RejectReason::SizeOutOfRange);
            }
        }

        if !resolution_allowed(&attributes.resolution, &ranking.allowed_resolutions) {
            return Verdict::Reject(RejectReason::ResolutionNotAllowed);
        }

        if let Some(language) = &attributes.language {
            if !ranking.allowed_languages.is_empty()
                && !ranking
                    .allowed_languages
                    .iter()
                    .any(|l| l.trim().eq_ignore_ascii_case(language))
            {
                return Verdict::Reject(RejectReason::LanguageNotAllowed);
            }
        }

        Verdict::Accept
    }
}

fn resolution_allowed(resolution: &Resolution, allowed: &[String]) -> bool {
    if allowed.is_empty() || resolution.is_unknown() {
        return true;
    }
    allowed
        .iter()
        .any(|label| Resolution::from_label(label) == *resolution)
}

/// Whether the preferred-language flag applies. Unknown is never preferred.
pub fn is_preferred_language(language: Option<&str>, preferred: &[String]) -> bool {
    language.is_some_and(|lang| {
        preferred
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(lang.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::raw_result;

    fn check(
        expected: &ExpectedMetadata,
        lookup: LookupStrategy,
        ranking: &RankingConfig,
        raw: &RawTorrentResult,
    ) -> Verdict {
        let validator = RelevanceValidator::new(expected, lookup, ranking);
        let attributes = resolve_attributes(raw, ranking);
        validator.validate(raw, &attributes)
    }

    fn free_text(expected: &ExpectedMetadata, raw: &RawTorrentResult) -> Verdict {
        check(expected, LookupStrategy::FreeText, &RankingConfig::default(), raw)
    }

    #[test]
    fn test_movie_title_and_year_accepts() {
        let expected = ExpectedMetadata::movie("The Matrix", Some(1999));
        let raw = raw_result("The.Matrix.1999.1080p.BluRay.x264-GROUP", "abc123");
        assert_eq!(free_text(&expected, &raw), Verdict::Accept);
    }

    #[test]
    fn test_movie_year_mismatch_rejects() {
        let expected = ExpectedMetadata::movie("The Matrix", Some(1999));
        let raw = raw_result("The Matrix Reloaded 2003 720p", "abc123");
        assert_eq!(
            free_text(&expected, &raw),
            Verdict::Reject(RejectReason::YearMismatch)
        );
    }

    #[test]
    fn test_movie_without_years_accepts() {
        let expected = ExpectedMetadata::movie("The Matrix", None);
        let raw = raw_result("The Matrix Reloaded 2003 720p", "abc123");
        assert_eq!(free_text(&expected, &raw), Verdict::Accept);

        let expected = ExpectedMetadata::movie("The Matrix", Some(1999));
        let raw = raw_result("The Matrix 720p", "abc123");
        assert_eq!(free_text(&expected, &raw), Verdict::Accept);
    }

    #[test]
    fn test_title_mismatch_rejects() {
        let expected = ExpectedMetadata::movie("The Matrix", Some(1999));
        let raw = raw_result("The.Matrices.1999.1080p", "abc123");
        assert_eq!(
            free_text(&expected, &raw),
            Verdict::Reject(RejectReason::TitleMismatch)
        );
    }

    #[test]
    fn test_series_episode_marker() {
        let expected = ExpectedMetadata::series("Show Name", Some(2), Some(5));

        let raw = raw_result("Show.Name.S02E05.1080p.WEB-DL", "abc123");
        assert_eq!(free_text(&expected, &raw), Verdict::Accept);

        let raw = raw_result("Show.Name.S02E06.1080p.WEB-DL", "abc123");
        assert_eq!(
            free_text(&expected, &raw),
            Verdict::Reject(RejectReason::EpisodeMismatch)
        );
    }

    #[test]
    fn test_series_without_episode_accepts_on_title() {
        let expected = ExpectedMetadata::series("Show Name", Some(2), None);
        let raw = raw_result("Show.Name.S02.Complete.1080p", "abc123");
        assert_eq!(free_text(&expected, &raw), Verdict::Accept);
    }

    #[test]
    fn test_missing_expected_title_rejects() {
        let mut expected = ExpectedMetadata::movie("The Matrix", None);
        expected.title = None;
        let raw = raw_result("The Matrix", "abc123");
        assert_eq!(
            free_text(&expected, &raw),
            Verdict::Reject(RejectReason::MissingExpectedTitle)
        );

        // a title with nothing left after normalization cannot be matched
        let expected = ExpectedMetadata::movie("...", None);
        let raw = raw_result("...", "abc123");
        assert_eq!(
            free_text(&expected, &raw),
            Verdict::Reject(RejectReason::MissingExpectedTitle)
        );
    }

    #[test]
    fn test_identifier_seeded_accepts_embedded_id() {
        let expected =
            ExpectedMetadata::movie("The Matrix", Some(1999)).with_canonical_id("tt0133093");
        let raw = raw_result("tt0133093 1080p BluRay", "abc123");
        let ranking = RankingConfig::default();

        assert_eq!(
            check(&expected, LookupStrategy::IdentifierSeeded, &ranking, &raw),
            Verdict::Accept
        );
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Reject(RejectReason::TitleMismatch)
        );
    }

    #[test]
    fn test_identifier_seeded_still_filters_preferences() {
        let expected =
            ExpectedMetadata::movie("The Matrix", Some(1999)).with_canonical_id("tt0133093");
        let mut raw = raw_result("TT0133093 720p", "abc123");
        raw.seeders = 1;
        let ranking = RankingConfig {
            min_seeders: 5,
            ..Default::default()
        };

        assert_eq!(
            check(&expected, LookupStrategy::IdentifierSeeded, &ranking, &raw),
            Verdict::Reject(RejectReason::TooFewSeeders)
        );
    }

    #[test]
    fn test_size_filters() {
        let expected = ExpectedMetadata::movie("The Matrix", None);
        let ranking = RankingConfig {
            min_size_mb: 500.0,
            max_size_mb: Some(4000.0),
            ..Default::default()
        };

        let mut raw = raw_result("The Matrix 1080p", "abc123");
        raw.size_bytes = 100 * 1024 * 1024;
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Reject(RejectReason::SizeOutOfRange)
        );

        raw.size_bytes = 5000 * 1024 * 1024;
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Reject(RejectReason::SizeOutOfRange)
        );

        raw.size_bytes = 2000 * 1024 * 1024;
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );

        // unknown size is never filtered
        raw.size_bytes = 0;
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );
    }

    #[test]
    fn test_resolution_allow_list() {
        let expected = ExpectedMetadata::movie("The Matrix", None);
        let ranking = RankingConfig {
            allowed_resolutions: vec!["4K".to_string(), "1080p".to_string()],
            ..Default::default()
        };

        let raw = raw_result("The Matrix 720p", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Reject(RejectReason::ResolutionNotAllowed)
        );

        let raw = raw_result("The Matrix 2160p", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );

        let raw = raw_result("The Matrix DVDRip", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );
    }

    #[test]
    fn test_language_allow_list() {
        let expected = ExpectedMetadata::movie("The Matrix", None);
        let ranking = RankingConfig {
            allowed_languages: vec!["English".to_string()],
            ..Default::default()
        };

        let raw = raw_result("The Matrix 1080p FRENCH", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Reject(RejectReason::LanguageNotAllowed)
        );

        let raw = raw_result("The Matrix 1080p ENG", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );

        let raw = raw_result("The Matrix 1080p", "abc123");
        assert_eq!(
            check(&expected, LookupStrategy::FreeText, &ranking, &raw),
            Verdict::Accept
        );
    }

    #[test]
    fn test_is_relevant_requires_identifier() {
        let expected = ExpectedMetadata::movie("The Matrix", Some(1999));
        let ranking = RankingConfig::default();
        let validator = RelevanceValidator::new(&expected, LookupStrategy::FreeText, &ranking);

        let raw = raw_result("The.Matrix.1999.1080p", "abc123");
        assert!(validator.is_relevant(&raw));

        let mut raw = raw_result("The.Matrix.1999.1080p", "abc123");
        raw.info_hash = None;
        assert!(!validator.is_relevant(&raw));

        let mut raw = raw_result("The.Matrix.1999.1080p", "abc123");
        raw.info_hash = None;
        raw.magnet_uri = Some("magnet:?xt=urn:btih:MFRGGZDFMZTWQ2LKNNWG23TPOBYXE43U&dn=x".to_string());
        assert!(validator.is_relevant(&raw));
    }

    #[test]
    fn test_is_preferred_language() {
        let preferred = vec!["english".to_string(), "French".to_string()];
        assert!(is_preferred_language(Some("french"), &preferred));
        assert!(!is_preferred_language(Some("german"), &preferred));
        assert!(!is_preferred_language(None, &preferred));
        assert!(!is_preferred_language(Some("english"), &[]));
    }
}
