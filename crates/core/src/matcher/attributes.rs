//! Attribute extraction from release titles.
//!
//! Structured fields declared by the indexer always win over what is parsed
//! out of the title; the title is only consulted to fill gaps.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::RankingConfig;
use crate::searcher::RawTorrentResult;

use super::types::{ParsedAttributes, Resolution};
use super::vocabulary::{
    find_terms, is_release_token, spaced_lower, Term, AUDIO_TERMS, LANGUAGE_TABLE, VIDEO_TERMS,
};

static RESOLUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{3,4}p|4k|uhd|fhd)\b").unwrap());

/// Parse every attribute out of a title alone.
///
/// The quality preference lists only decide which tag is reported when a
/// title carries several.
pub fn extract_attributes(title: &str, ranking: &RankingConfig) -> ParsedAttributes {
    ParsedAttributes {
        resolution: extract_resolution(title),
        video_quality: extract_video_quality(title, &ranking.preferred_video_qualities)
            .map(str::to_string),
        audio_quality: extract_audio_quality(title, &ranking.preferred_audio_qualities)
            .map(str::to_string),
        language: detect_language(title).map(str::to_string),
    }
}

/// Attributes of a raw record: declared fields verbatim, title-derived otherwise.
pub fn resolve_attributes(raw: &RawTorrentResult, ranking: &RankingConfig) -> ParsedAttributes {
    let title = raw.title_or_empty();

    ParsedAttributes {
        resolution: match declared(&raw.resolution) {
            Some(label) => Resolution::from_label(label),
            None => extract_resolution(title),
        },
        video_quality: declared(&raw.quality).map(str::to_string).or_else(|| {
            extract_video_quality(title, &ranking.preferred_video_qualities).map(str::to_string)
        }),
        audio_quality: declared(&raw.audio).map(str::to_string).or_else(|| {
            extract_audio_quality(title, &ranking.preferred_audio_qualities).map(str::to_string)
        }),
        language: declared(&raw.language)
            .map(str::to_string)
            .or_else(|| detect_language(title).map(str::to_string)),
    }
}

fn declared(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// First resolution tag in the title.
pub fn extract_resolution(title: &str) -> Resolution {
    RESOLUTION_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| Resolution::from_label(m.as_str()))
        .unwrap_or_default()
}

pub fn extract_video_quality(title: &str, preferences: &[String]) -> Option<&'static str> {
    pick_term(title, VIDEO_TERMS, preferences)
}

pub fn extract_audio_quality(title: &str, preferences: &[String]) -> Option<&'static str> {
    pick_term(title, AUDIO_TERMS, preferences)
}

/// Among all tags found, the best-preferred one, else the first in title order.
fn pick_term(title: &str, terms: &[Term], preferences: &[String]) -> Option<&'static str> {
    let found = find_terms(&spaced_lower(title), terms);

    preferences
        .iter()
        .find_map(|pref| {
            found
                .iter()
                .find(|m| m.canonical.eq_ignore_ascii_case(pref.trim()))
        })
        .or_else(|| found.first())
        .map(|m| m.canonical)
}

/// Rank of a value in an ordered preference list (best first).
///
/// `len - index` when present, 0 when absent or unknown.
pub fn quality_rank(value: Option<&str>, preferences: &[String]) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    let value = value.trim();
    preferences
        .iter()
        .position(|p| p.trim().eq_ignore_ascii_case(value))
        .map(|idx| (preferences.len() - idx) as u32)
        .unwrap_or(0)
}

/// Detect the release language from language markers in the title.
///
/// Two-letter codes only count when written in upper case and placed after
/// a year or another release tag, so a title word like "IT" is not a code.
pub fn detect_language(title: &str) -> Option<&'static str> {
    let original: Vec<char> = title.chars().collect();
    let folded: Vec<char> = original
        .iter()
        .map(|&c| {
            if c.is_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    LANGUAGE_TABLE
        .iter()
        .find(|(key, _)| {
            let key: Vec<char> = key.chars().collect();
            let short_code = key.len() == 2;
            let found = find_token(&folded, &key).any(|start| {
                !short_code
                    || (original[start..start + key.len()]
                        .iter()
                        .all(|c| c.is_uppercase())
                        && follows_release_marker(&folded, start))
            });
            found
        })
        .map(|(_, language)| *language)
}

/// Whether a year or release tag appears before `start`.
fn follows_release_marker(folded: &[char], start: usize) -> bool {
    let prefix: String = folded[..start].iter().collect();
    prefix.split_whitespace().any(|token| {
        is_release_token(token)
            || token
                .parse::<u16>()
                .map_or(false, |year| token.len() == 4 && (1900..=2099).contains(&year))
    })
}

/// Start positions where `key` occurs between token boundaries.
fn find_token<'a>(haystack: &'a [char], key: &'a [char]) -> impl Iterator<Item = usize> + 'a {
    let is_word = |c: char| c.is_alphanumeric();
    (0..haystack.len().saturating_sub(key.len() - 1))
        .filter(move |&start| {
            let end = start + key.len();
            end <= haystack.len()
                && haystack[start..end] == *key
                && (start == 0 || !is_word(haystack[start - 1]))
                && (end == haystack.len() || !is_word(haystack[end]))
        })
}
