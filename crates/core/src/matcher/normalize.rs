//! Title normalization.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::NormalizedTitle;
use super::vocabulary::release_run_len;

/// A year inside round or square brackets: "(1999)", "[ 2010 ]".
static BRACKET_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\(\[]\s*((?:19|20)\d{2})\s*[\)\]]").unwrap());

/// Reduce a free-text title to its comparable core.
///
/// Lower-cases, strips punctuation and release metadata (codecs, sources,
/// resolutions, languages, scene boilerplate, season/episode markers) and
/// pulls out a release year. Never fails: garbage in yields an empty text.
pub fn normalize_title(raw: &str) -> NormalizedTitle {
    let (working, mut year) = take_bracket_year(raw);
    let mut tokens = tokenize(&working);

    loop {
        let before = tokens.len();

        let stripped = strip_release_tags(&tokens);
        if !stripped.is_empty() {
            tokens = stripped;
        }

        let (kept, trailing_year) = strip_trailing_years(tokens);
        tokens = kept;
        if year.is_none() {
            year = trailing_year;
        }

        if tokens.len() == before {
            break;
        }
    }

    NormalizedTitle {
        text: tokens.join(" "),
        year,
    }
}

/// Lower-case and split on anything that is not a letter or digit.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whether `needle` occurs in `haystack` as a whole run of tokens.
///
/// Both sides are expected to be normalized text. An empty needle never matches.
pub(crate) fn contains_title(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// Whether the raw title carries the `sXXeYY` marker for this episode.
pub(crate) fn has_episode_marker(raw_title: &str, season: u32, episode: u32) -> bool {
    let marker = format!("s{:02}e{:02}", season, episode);
    tokenize(raw_title).iter().any(|token| {
        token
            .strip_prefix(marker.as_str())
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

fn take_bracket_year(raw: &str) -> (String, Option<u16>) {
    if let Some(caps) = BRACKET_YEAR_RE.captures(raw) {
        if let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) {
            let remainder = format!("{} {}", &raw[..whole.start()], &raw[whole.end()..]);
            if remainder.chars().any(char::is_alphanumeric) {
                return (remainder, digits.as_str().parse().ok());
            }
        }
    }
    (raw.to_string(), None)
}

fn parse_year(token: &str) -> Option<u16> {
    if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().filter(|y| (1900..=2099).contains(y))
}

/// Drop year tokens after the first position, returning the last one dropped.
fn strip_trailing_years(tokens: Vec<String>) -> (Vec<String>, Option<u16>) {
    let mut found = None;
    let mut kept = Vec::with_capacity(tokens.len());
    for (idx, token) in tokens.into_iter().enumerate() {
        match parse_year(&token) {
            Some(year) if idx > 0 => found = Some(year),
            _ => kept.push(token),
        }
    }
    (kept, found)
}

fn strip_release_tags(tokens: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(tokens.len());
    let mut idx = 0;
    while idx < tokens.len() {
        if let Some(len) = release_run_len(&tokens[idx..]) {
            idx += len;
        } else {
            kept.push(tokens[idx].clone());
            idx += 1;
        }
    }
    kept
}
