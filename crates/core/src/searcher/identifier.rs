//! Content identifier (info hash) derivation and magnet URI construction.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{RawTorrentResult, RecordError};

/// `btih:` segment of a magnet link, up to the next `&` or `/`.
static BTIH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)btih:([^&/]+)").unwrap());

/// Extract the raw `btih` value from a magnet-style URI.
pub fn extract_btih(uri: &str) -> Option<&str> {
    BTIH_RE
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

/// Derive the lower-case hex content identifier for a raw result.
///
/// Prefers the declared `info_hash`, then the magnet URI, then a magnet
/// link hiding in `torrent_url`. Returns `Ok(None)` when nothing can be
/// derived and `Err` when a value exists but is not a usable identifier.
pub fn derive_info_hash(raw: &RawTorrentResult) -> Result<Option<String>, RecordError> {
    let declared = raw
        .info_hash
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let candidate = declared
        .or_else(|| raw.magnet_uri.as_deref().and_then(extract_btih))
        .or_else(|| raw.torrent_url.as_deref().and_then(extract_btih));

    match candidate {
        Some(hash) => normalize_btih(hash).map(Some),
        None => Ok(None),
    }
}

/// Normalize a v1 info hash to 40 lower-case hex characters.
///
/// Accepts the 40-character hex form and the 32-character base32 form
/// magnet links may carry.
pub fn normalize_btih(hash: &str) -> Result<String, RecordError> {
    let malformed = || RecordError::MalformedIdentifier(hash.to_string());

    match hash.len() {
        40 if hash.chars().all(|c| c.is_ascii_hexdigit()) => Ok(hash.to_ascii_lowercase()),
        32 => decode_base32(hash).map(hex::encode).ok_or_else(malformed),
        _ => Err(malformed()),
    }
}

/// RFC 4648 base32 (no padding), case-insensitive.
fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0u32;

    for c in input.bytes() {
        let value = match c.to_ascii_uppercase() {
            c @ b'A'..=b'Z' => c - b'A',
            c @ b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | u64::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1u64 << bits) - 1;
        }
    }

    Some(out)
}

/// Build a magnet URI from an identifier, display name and tracker list.
///
/// Duplicate trackers are skipped; order is otherwise kept.
pub fn build_magnet_uri(info_hash: &str, display_name: &str, trackers: &[String]) -> String {
    let mut uri = format!("magnet:?xt=urn:btih:{}", info_hash);

    if !display_name.is_empty() {
        uri.push_str("&dn=");
        uri.push_str(&urlencoding::encode(display_name));
    }

    let mut seen: Vec<&str> = Vec::with_capacity(trackers.len());
    for tracker in trackers {
        let tracker = tracker.trim();
        if tracker.is_empty() || seen.contains(&tracker) {
            continue;
        }
        seen.push(tracker);
        uri.push_str("&tr=");
        uri.push_str(&urlencoding::encode(tracker));
    }

    uri
}
