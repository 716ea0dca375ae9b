//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use streamsift_core::testing::fixtures::{raw_result, batch_request};
//! use streamsift_core::ExpectedMetadata;
//!
//! let request = batch_request(
//!     ExpectedMetadata::movie("The Matrix", Some(1999)),
//!     vec![raw_result("The.Matrix.1999.1080p.BluRay.x264-GROUP", "abc123")],
//! );
//! ```

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::batch::BatchRequest;
    use crate::config::RankingConfig;
    use crate::matcher::{CandidateStream, ExpectedMetadata, LookupStrategy, ParsedAttributes};
    use crate::searcher::RawTorrentResult;

    /// Expand a short label into a 40-character hex info hash.
    ///
    /// The label bytes are hex-encoded and padded with `f`. Labels with any
    /// upper-case letter produce an upper-case hash, so `"ABC"` and `"abc"`
    /// name the same content in different letter case.
    pub fn info_hash(label: &str) -> String {
        let bytes: Vec<u8> = label.to_ascii_lowercase().bytes().take(20).collect();
        let mut hash = hex::encode(bytes);
        while hash.len() < 40 {
            hash.push('f');
        }
        if label.chars().any(|c| c.is_ascii_uppercase()) {
            hash.make_ascii_uppercase();
        }
        hash
    }

    /// Recover the label an [`info_hash`] was built from.
    pub fn hash_label(hash: &str) -> String {
        match hex::decode(hash) {
            Ok(mut bytes) => {
                while bytes.last() == Some(&0xff) {
                    bytes.pop();
                }
                String::from_utf8_lossy(&bytes).into_owned()
            }
            Err(_) => hash.to_string(),
        }
    }

    /// Create a raw indexer record with reasonable defaults.
    pub fn raw_result(title: &str, label: &str) -> RawTorrentResult {
        RawTorrentResult {
            title: Some(title.to_string()),
            info_hash: Some(info_hash(label)),
            seeders: 10,
            leechers: 2,
            size_bytes: 1024 * 1024 * 1024, // 1 GB
            indexer: "mock-indexer".to_string(),
            ..Default::default()
        }
    }

    /// Create a raw record whose identifier only lives in a magnet link.
    pub fn raw_result_with_magnet(title: &str, label: &str) -> RawTorrentResult {
        RawTorrentResult {
            info_hash: None,
            magnet_uri: Some(format!("magnet:?xt=urn:btih:{}&dn=test", info_hash(label))),
            ..raw_result(title, label)
        }
    }

    /// Create a candidate with neutral ranking fields (all zero, no date).
    pub fn candidate(title: &str, label: &str) -> CandidateStream {
        let info_hash = info_hash(label).to_ascii_lowercase();
        CandidateStream {
            title: title.to_string(),
            magnet_uri: format!("magnet:?xt=urn:btih:{}", info_hash),
            info_hash,
            indexer: "mock-indexer".to_string(),
            size_bytes: 0,
            seeders: 0,
            leechers: 0,
            publish_date: None,
            attributes: ParsedAttributes::default(),
            resolution_rank: 0,
            video_rank: 0,
            audio_rank: 0,
            score: 0.0,
            preferred_language: false,
        }
    }

    /// Free-text batch with the default ranking config.
    pub fn batch_request(expected: ExpectedMetadata, results: Vec<RawTorrentResult>) -> BatchRequest {
        BatchRequest {
            results,
            expected,
            lookup: LookupStrategy::FreeText,
            config: RankingConfig::default(),
        }
    }
}
