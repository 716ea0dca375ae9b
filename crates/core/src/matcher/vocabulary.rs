//! Fixed release-name vocabularies.
//!
//! One canonical table per attribute; the normalizer, the attribute
//! extractor and the validator all read from here.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// A vocabulary entry: canonical value plus the spellings seen in titles.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Term {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    /// May directly follow letters (e.g. the "5.1" in "DDP5.1").
    pub glued: bool,
}

const fn term(canonical: &'static str, aliases: &'static [&'static str]) -> Term {
    Term {
        canonical,
        aliases,
        glued: false,
    }
}

const fn glued(canonical: &'static str, aliases: &'static [&'static str]) -> Term {
    Term {
        canonical,
        aliases,
        glued: true,
    }
}

/// Video quality tags (source and codec).
pub(crate) const VIDEO_TERMS: &[Term] = &[
    term("remux", &["remux"]),
    term("bluray", &["bluray", "blu-ray", "blu ray"]),
    term("bdrip", &["bdrip", "brrip"]),
    term("web-dl", &["web-dl", "webdl", "web dl"]),
    term("webrip", &["webrip", "web-rip", "web rip"]),
    term("hdrip", &["hdrip"]),
    term("hdtv", &["hdtv"]),
    term("dvdrip", &["dvdrip", "dvd-rip"]),
    term("x264", &["x264", "h264", "h 264", "avc"]),
    term("x265", &["x265", "h265", "h 265"]),
    term("hevc", &["hevc"]),
    term("xvid", &["xvid"]),
    term("av1", &["av1"]),
];

/// Audio quality tags and bare channel layouts.
pub(crate) const AUDIO_TERMS: &[Term] = &[
    term("truehd", &["truehd", "true-hd"]),
    term("dts-hd", &["dts-hd", "dtshd", "dts-ma"]),
    term("atmos", &["atmos"]),
    term("dts", &["dts"]),
    term("eac3", &["eac3", "e-ac3", "e-ac-3"]),
    term("ddp", &["ddp", "dd+"]),
    term("ac3", &["ac3", "dd"]),
    term("aac", &["aac"]),
    term("mp3", &["mp3"]),
    glued("7.1", &["7 1"]),
    glued("5.1", &["5 1"]),
    glued("2.0", &["2 0"]),
];

/// Language markers, scanned in order; the first key present wins.
///
/// Two-letter codes only count when written in upper case in the title.
pub(crate) const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("multi-language", "multi"),
    ("multi language", "multi"),
    ("multi", "multi"),
    ("dual-audio", "dual-audio"),
    ("dual audio", "dual-audio"),
    ("english", "english"),
    ("eng", "english"),
    ("en", "english"),
    ("truefrench", "french"),
    ("vostfr", "french"),
    ("french", "french"),
    ("fre", "french"),
    ("fra", "french"),
    ("fr", "french"),
    ("german", "german"),
    ("ger", "german"),
    ("deu", "german"),
    ("de", "german"),
    ("spanish", "spanish"),
    ("castellano", "spanish"),
    ("latino", "spanish"),
    ("spa", "spanish"),
    ("esp", "spanish"),
    ("es", "spanish"),
    ("italian", "italian"),
    ("ita", "italian"),
    ("it", "italian"),
    ("portuguese", "portuguese"),
    ("por", "portuguese"),
    ("pt", "portuguese"),
    ("russian", "russian"),
    ("rus", "russian"),
    ("ru", "russian"),
    ("japanese", "japanese"),
    ("jpn", "japanese"),
    ("ja", "japanese"),
    ("korean", "korean"),
    ("kor", "korean"),
    ("ko", "korean"),
    ("chinese", "chinese"),
    ("chi", "chinese"),
    ("zho", "chinese"),
    ("zh", "chinese"),
    ("hindi", "hindi"),
    ("hin", "hindi"),
    ("hi", "hindi"),
    ("arabic", "arabic"),
    ("ara", "arabic"),
    ("ar", "arabic"),
    ("dutch", "dutch"),
    ("nld", "dutch"),
    ("nl", "dutch"),
    ("polish", "polish"),
    ("pol", "polish"),
    ("pl", "polish"),
    ("turkish", "turkish"),
    ("tur", "turkish"),
    ("tr", "turkish"),
    ("swedish", "swedish"),
    ("swe", "swedish"),
    ("sv", "swedish"),
];

/// Single release-metadata tokens removed by the normalizer.
static RELEASE_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // containers and codecs
        "x264", "x265", "h264", "h265", "hevc", "avc", "av1", "xvid", "divx", "10bit", "8bit",
        "hdr", "hdr10", "dv", "mkv", "mp4", "avi",
        // sources
        "bluray", "bdrip", "brrip", "remux", "webrip", "webdl", "web", "hdrip", "dvdrip", "hdtv",
        "dvd", "dvdscr", "hdcam",
        // audio
        "aac", "ac3", "dts", "eac3", "ddp", "mp3", "flac", "truehd", "atmos", "opus",
        // resolution words
        "4k", "uhd", "fhd",
        // languages (no two-letter codes)
        "english", "eng", "french", "truefrench", "vostfr", "fre", "fra", "german", "ger", "deu",
        "spanish", "castellano", "latino", "spa", "esp", "italian", "ita", "portuguese", "por",
        "russian", "rus", "japanese", "jpn", "korean", "kor", "chinese", "chi", "zho", "hindi",
        "hin", "arabic", "ara", "dutch", "nld", "polish", "pol", "turkish", "tur", "swedish",
        "swe", "multi", "subs", "subbed", "dubbed",
        // scene boilerplate
        "repack", "proper", "internal", "extended", "uncut", "unrated", "remastered", "limited",
        "freeleech", "readnfo", "nfo", "rerip", "imax",
    ]
    .into_iter()
    .collect()
});

/// Multi-token release phrases, as they look after punctuation stripping.
const RELEASE_PHRASES: &[&[&str]] = &[
    &["web", "dl"],
    &["web", "rip"],
    &["blu", "ray"],
    &["dts", "hd", "ma"],
    &["dts", "hd"],
    &["dts", "ma"],
    &["true", "hd"],
    &["h", "264"],
    &["h", "265"],
    &["e", "ac3"],
    &["dd", "5", "1"],
    &["5", "1"],
    &["7", "1"],
    &["director", "s", "cut"],
    &["directors", "cut"],
    &["dual", "audio"],
    &["multi", "language"],
];

/// Season/episode markers: s01, s01e02, s01e02e03, e02.
static SEASON_EPISODE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:s\d{1,2}(?:e\d{1,3})*|e\d{1,3})$").unwrap());

/// Resolution tokens: 720p, 1080p, 1080i, 2160p...
static RESOLUTION_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,4}[pi]$").unwrap());

/// Audio codecs with glued channel counts: ddp5, aac2, dd5...
static AUDIO_CHANNEL_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:ddp|dd|eac3|ac3|aac|dts|truehd|atmos|flac|opus)\d{1,2}$").unwrap());

/// Whether a single normalized token is release metadata.
pub(crate) fn is_release_token(token: &str) -> bool {
    RELEASE_TOKENS.contains(token)
        || SEASON_EPISODE_TOKEN_RE.is_match(token)
        || RESOLUTION_TOKEN_RE.is_match(token)
        || AUDIO_CHANNEL_TOKEN_RE.is_match(token)
}

/// Number of tokens at the start of `tokens` that form release metadata.
///
/// Longest phrase first, then a codec with its channel split off by
/// punctuation ("ddp5" "1"), then a single token.
pub(crate) fn release_run_len(tokens: &[String]) -> Option<usize> {
    let first = tokens.first()?;

    let phrase = RELEASE_PHRASES
        .iter()
        .filter(|phrase| {
            phrase.len() <= tokens.len()
                && phrase.iter().zip(tokens).all(|(p, t)| *p == t.as_str())
        })
        .map(|phrase| phrase.len())
        .max();
    if phrase.is_some() {
        return phrase;
    }

    if AUDIO_CHANNEL_TOKEN_RE.is_match(first)
        && tokens
            .get(1)
            .is_some_and(|next| next.len() == 1 && next.bytes().all(|b| b.is_ascii_digit()))
    {
        return Some(2);
    }

    is_release_token(first).then_some(1)
}

/// A vocabulary hit inside a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TermMatch {
    pub start: usize,
    pub end: usize,
    pub canonical: &'static str,
}

/// Lower-case a title and turn separators into spaces, keeping `-` and `+`
/// so that spellings such as "web-dl" and "dd+" survive.
pub(crate) fn spaced_lower(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '+' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}

/// Find every vocabulary term in `haystack` (already passed through
/// [`spaced_lower`]), in title order, without overlaps.
///
/// A match must start at a word boundary (unless the term is glued) and must
/// not be followed by a letter, so "dts" does not fire inside "dtsx" but
/// "ddp" does fire inside "ddp5".
pub(crate) fn find_terms(haystack: &str, terms: &[Term]) -> Vec<TermMatch> {
    let bytes = haystack.as_bytes();
    let mut matches: Vec<TermMatch> = Vec::new();

    for term in terms {
        for alias in term.aliases {
            for (start, _) in haystack.match_indices(alias) {
                let end = start + alias.len();
                let before_ok = start == 0 || {
                    let prev = bytes[start - 1];
                    if term.glued {
                        !prev.is_ascii_digit()
                    } else {
                        !prev.is_ascii_alphanumeric()
                    }
                };
                let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphabetic();
                if before_ok && after_ok {
                    matches.push(TermMatch {
                        start,
                        end,
                        canonical: term.canonical,
                    });
                }
            }
        }
    }

    // Longest match wins at a given position; later overlapping hits are dropped.
    matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut result: Vec<TermMatch> = Vec::with_capacity(matches.len());
    for m in matches {
        if result.last().map_or(true, |last| m.start >= last.end) {
            result.push(m);
        }
    }
    result
}
