//! Types exchanged with the indexer-query layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw result from a single indexer, exactly as the query client parsed it.
///
/// Every field is "declared" by the indexer and may be missing or wrong.
/// The ranking pipeline never mutates a raw result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTorrentResult {
    /// Free-text release title. `None` when the indexer sent a null title.
    #[serde(default)]
    pub title: Option<String>,
    /// Info hash as declared by the indexer (any case).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    /// Magnet URI from this indexer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Download link; some indexers put the magnet link here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_url: Option<String>,
    /// Declared seeders.
    #[serde(default)]
    pub seeders: u32,
    /// Declared leechers (peers).
    #[serde(default)]
    pub leechers: u32,
    /// Declared size in bytes. 0 means unknown.
    #[serde(default)]
    pub size_bytes: u64,
    /// Declared publish timestamp, unparsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    /// Tracker/indexer that returned this result.
    #[serde(default)]
    pub indexer: String,
    /// Structured resolution supplied by the indexer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Structured video quality supplied by the indexer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Structured audio quality/channels supplied by the indexer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Structured language supplied by the indexer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl RawTorrentResult {
    /// Title used for matching. A missing title reads as empty.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Errors that make a single record unusable.
///
/// These never escalate past the record: the batch logs them and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no title")]
    MissingTitle,

    #[error("malformed content identifier: {0:?}")]
    MalformedIdentifier(String),
}
