//! Shared types for result matching and ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Kind of content being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Movie,
    Series,
}

/// How the originating indexer lookup was keyed.
///
/// Identifier-seeded lookups rarely return off-topic results, so the
/// validator also accepts titles that embed the canonical identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Query keyed by a canonical catalog identifier.
    IdentifierSeeded,
    /// Free-text query.
    #[default]
    FreeText,
}

/// What the user asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedMetadata {
    /// Canonical title. Without it nothing can be validated.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Canonical catalog identifier (e.g. an IMDb id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    /// Alternate/localized titles; only the scorer looks at these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_titles: Vec<String>,
}

impl ExpectedMetadata {
    /// Expected metadata for a movie.
    pub fn movie(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: Some(title.into()),
            year,
            kind: ContentKind::Movie,
            season: None,
            episode: None,
            canonical_id: None,
            alternate_titles: Vec::new(),
        }
    }

    /// Expected metadata for a series episode (or whole series when both are `None`).
    pub fn series(title: impl Into<String>, season: Option<u32>, episode: Option<u32>) -> Self {
        Self {
            title: Some(title.into()),
            year: None,
            kind: ContentKind::Series,
            season,
            episode,
            canonical_id: None,
            alternate_titles: Vec::new(),
        }
    }

    pub fn with_canonical_id(mut self, id: impl Into<String>) -> Self {
        self.canonical_id = Some(id.into());
        self
    }

    pub fn with_alternate_titles(mut self, titles: Vec<String>) -> Self {
        self.alternate_titles = titles;
        self
    }

    /// Canonical identifier, lower-cased, if one is set and non-blank.
    pub(crate) fn canonical_id_lower(&self) -> Option<String> {
        self.canonical_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_lowercase)
    }
}

/// A title reduced to its comparable core.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizedTitle {
    /// Lower-cased, punctuation- and release-tag-free text.
    pub text: String,
    /// Release year found in the title, if any.
    pub year: Option<u16>,
}

/// Video resolution bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolution {
    Uhd2160,
    Fhd1080,
    Hd720,
    Sd576,
    Sd480,
    /// Recognised as a resolution but outside the ladder (e.g. "360p").
    Other(String),
    #[default]
    Unknown,
}

impl Resolution {
    /// Parse a resolution label (declared by an indexer or found in a title).
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "" => Resolution::Unknown,
            "2160p" | "4k" | "uhd" | "fhd" => Resolution::Uhd2160,
            "1080p" => Resolution::Fhd1080,
            "720p" => Resolution::Hd720,
            "576p" => Resolution::Sd576,
            "480p" => Resolution::Sd480,
            _ => Resolution::Other(label),
        }
    }

    /// Canonical label, `None` when unknown.
    pub fn label(&self) -> Option<&str> {
        match self {
            Resolution::Uhd2160 => Some("2160p"),
            Resolution::Fhd1080 => Some("1080p"),
            Resolution::Hd720 => Some("720p"),
            Resolution::Sd576 => Some("576p"),
            Resolution::Sd480 => Some("480p"),
            Resolution::Other(label) => Some(label.as_str()),
            Resolution::Unknown => None,
        }
    }

    /// Position on the rank ladder (higher is better).
    pub fn rank(&self) -> u32 {
        match self {
            Resolution::Uhd2160 => 4,
            Resolution::Fhd1080 => 3,
            Resolution::Hd720 => 2,
            Resolution::Sd576 | Resolution::Sd480 => 1,
            Resolution::Other(_) | Resolution::Unknown => 0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.label() {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_none(),
        }
    }
}

/// Attributes of one record after applying declared-over-derived precedence.
///
/// `None` means unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedAttributes {
    pub resolution: Resolution,
    pub video_quality: Option<String>,
    pub audio_quality: Option<String>,
    pub language: Option<String>,
}

/// A record that survived validation, ready to be ordered.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateStream {
    /// Display title.
    pub title: String,
    /// Lower-case content identifier.
    pub info_hash: String,
    /// Magnet URI built from the identifier and the tracker list.
    pub magnet_uri: String,
    /// Tracker/indexer that returned the record.
    pub indexer: String,
    pub size_bytes: u64,
    pub seeders: u32,
    pub leechers: u32,
    /// Parsed publish date; `None` when missing or unparsable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: ParsedAttributes,
    pub resolution_rank: u32,
    pub video_rank: u32,
    pub audio_rank: u32,
    /// Relevance score (>= 0).
    pub score: f64,
    /// Whether the language is one of the preferred ones.
    pub preferred_language: bool,
}

impl CandidateStream {
    /// Publish timestamp used for ordering; missing dates count as the epoch.
    pub fn publish_timestamp(&self) -> i64 {
        self.publish_date.map(|d| d.timestamp()).unwrap_or(0)
    }
}
