//! M3U playlist parsing
//!
//! Produces one [`RawEntry`] per `#EXTINF` block (and per bare URL line) from
//! playlist text. The parser is forgiving about the damage commonly found in
//! hand-merged playlists:
//!
//! - an `#EXTINF` glued to the end of the previous URL is split onto its own line
//! - the URL may appear a few lines after its `#EXTINF`, past blanks and comments
//! - a URL line with trailing garbage keeps the first token that looks like a URL
//!
//! Nothing is validated here; an `#EXTINF` with no URL still yields an entry
//! (with an empty stream URL) so the rejection shows up in the run statistics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::errors::ConfigResult;
use crate::models::{EntryOrigin, RawEntry};
use crate::utils::url::looks_like_stream_url;

/// How many lines after an `#EXTINF` are searched for its URL
pub const DEFAULT_URL_LOOKAHEAD: usize = 5;

const GLUED_EXTINF_PATTERN: &str =
    r"(?i)((?:https?|rtmps?|rtsp)://\S*?|\.m3u8?|\.ts)(#EXTINF)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub extinf_lines: usize,
    pub entries: usize,
    /// URL lines that had no `#EXTINF` in front of them
    pub bare_urls: usize,
    /// `#EXTINF` lines for which no URL was found
    pub missing_urls: usize,
    /// Glued or stray `#EXTINF` occurrences that were split apart
    pub malformed_fixed: usize,
}

impl ParseStats {
    /// Add the counters of another parse, for runs over several files
    pub fn absorb(&mut self, other: &ParseStats) {
        self.total_lines += other.total_lines;
        self.extinf_lines += other.extinf_lines;
        self.entries += other.entries;
        self.bare_urls += other.bare_urls;
        self.missing_urls += other.missing_urls;
        self.malformed_fixed += other.malformed_fixed;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedPlaylist {
    pub entries: Vec<RawEntry>,
    pub stats: ParseStats,
}

/// Metadata carried by one `#EXTINF` line
#[derive(Debug, Clone, Default, PartialEq)]
struct ExtinfLine {
    title: String,
    attributes: HashMap<String, String>,
}

impl ExtinfLine {
    fn attribute(&self, key: &str) -> String {
        self.attributes.get(key).cloned().unwrap_or_default()
    }

    fn into_raw_entry(self, stream_url: String, source_text: String) -> RawEntry {
        let name = if self.title.trim().is_empty() {
            self.attribute("tvg-name")
        } else {
            self.title.clone()
        };

        RawEntry {
            name,
            group: self.attribute("group-title"),
            logo_url: self.attribute("tvg-logo"),
            epg_id: self.attribute("tvg-id"),
            stream_url,
            origin: EntryOrigin::Import,
            source_text: Some(source_text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct M3uParser {
    lookahead: usize,
    glued_extinf: Regex,
}

impl M3uParser {
    pub fn new() -> ConfigResult<Self> {
        Ok(Self {
            lookahead: DEFAULT_URL_LOOKAHEAD,
            glued_extinf: Regex::new(GLUED_EXTINF_PATTERN)?,
        })
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.max(1);
        self
    }

    /// Parse playlist text into raw entries, in file order
    pub fn parse(&self, content: &str) -> ParsedPlaylist {
        let mut stats = ParseStats::default();
        let (content, glued) = split_glued_extinf(&self.glued_extinf, content);
        stats.malformed_fixed += glued;

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        stats.total_lines = lines.len();

        let mut entries = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim().to_string();

            if line.is_empty() {
                i += 1;
                continue;
            }

            if is_extinf(&line) {
                stats.extinf_lines += 1;
                let extinf = parse_extinf_line(&line);

                match self.find_url(&mut lines, i, &mut stats) {
                    Some((url, next)) => {
                        let source_text = format!("{line}\n{url}");
                        entries.push(extinf.into_raw_entry(url, source_text));
                        i = next;
                    }
                    None => {
                        debug!("No stream URL found for '{}' (line {})", line, i + 1);
                        stats.missing_urls += 1;
                        entries.push(extinf.into_raw_entry(String::new(), line.clone()));
                        i += 1;
                    }
                }
                continue;
            }

            if !line.starts_with('#') {
                match pick_url(&line) {
                    Some(url) => {
                        warn!(
                            "Found stream URL without EXTINF metadata at line {}: {}",
                            i + 1,
                            url
                        );
                        stats.bare_urls += 1;
                        entries.push(bare_url_entry(url));
                    }
                    None => debug!("Skipping stray line {}: {}", i + 1, line),
                }
            }

            i += 1;
        }

        stats.entries = entries.len();
        info!(
            "Parsed {} entries from {} lines ({} EXTINF, {} without URL, {} malformed fixed)",
            stats.entries,
            stats.total_lines,
            stats.extinf_lines,
            stats.missing_urls,
            stats.malformed_fixed
        );

        ParsedPlaylist { entries, stats }
    }

    /// Search the lines after `extinf_index` for a URL
    ///
    /// Returns the URL and the index parsing resumes at. A line holding a URL
    /// followed by another `#EXTINF` is split in place so the second entry is
    /// parsed on the next iteration.
    fn find_url(
        &self,
        lines: &mut [String],
        extinf_index: usize,
        stats: &mut ParseStats,
    ) -> Option<(String, usize)> {
        let last = (extinf_index + self.lookahead).min(lines.len().saturating_sub(1));

        for j in (extinf_index + 1)..=last {
            let candidate = lines[j].trim().to_string();

            if is_extinf(&candidate) {
                // The next entry starts before any URL was seen
                return None;
            }
            if candidate.is_empty() || candidate.starts_with('#') {
                continue;
            }

            let (candidate, requeued) = match find_case_insensitive(&candidate, "#EXTINF") {
                Some(pos) => {
                    lines[j] = candidate[pos..].to_string();
                    stats.malformed_fixed += 1;
                    (candidate[..pos].trim().to_string(), true)
                }
                None => (candidate, false),
            };

            if let Some(url) = pick_url(&candidate) {
                let next = if requeued { j } else { j + 1 };
                return Some((url, next));
            }

            if requeued {
                return None;
            }
        }

        None
    }
}

fn is_extinf(line: &str) -> bool {
    line.get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("#EXTINF"))
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_uppercase().find(&needle.to_ascii_uppercase())
}

/// Put every `#EXTINF` that directly follows a URL onto its own line
fn split_glued_extinf<'a>(re: &Regex, content: &'a str) -> (Cow<'a, str>, usize) {
    let glued = re.find_iter(content).count();
    if glued == 0 {
        return (Cow::Borrowed(content), 0);
    }

    debug!("Splitting {} glued EXTINF lines", glued);
    (re.replace_all(content, "$1\n$2"), glued)
}

/// The URL on a candidate line, ignoring trailing garbage
fn pick_url(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    if let Some(token) = candidate
        .split_whitespace()
        .find(|token| looks_like_stream_url(token))
    {
        return Some(token.to_string());
    }

    if candidate.contains('/') {
        return Some(candidate.to_string());
    }

    None
}

/// Entry for a URL with no metadata, named after its last path segment
fn bare_url_entry(url: String) -> RawEntry {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let name = without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or_default()
        .to_string();

    RawEntry {
        name,
        stream_url: url.clone(),
        origin: EntryOrigin::Import,
        source_text: Some(url),
        ..Default::default()
    }
}

/// Split an `#EXTINF:<duration> <attrs>,<title>` line
///
/// The title starts after the first comma outside a quoted attribute value,
/// so commas inside `group-title="News, Weather"` are kept.
fn parse_extinf_line(line: &str) -> ExtinfLine {
    let body = line
        .get(7..)
        .map(|rest| rest.strip_prefix(':').unwrap_or(rest))
        .unwrap_or_default();

    let mut in_quotes = false;
    let mut title_start = None;
    for (pos, ch) in body.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                title_start = Some(pos);
                break;
            }
            _ => {}
        }
    }

    let (attrs_part, title) = match title_start {
        Some(pos) => (&body[..pos], body[pos + 1..].trim()),
        None => (body, ""),
    };

    ExtinfLine {
        title: title.to_string(),
        attributes: parse_extinf_attributes(attrs_part),
    }
}

/// Parse `key="value"` and `key=value` pairs; keys are lower-cased
///
/// The leading duration token has no `=` and is ignored.
fn parse_extinf_attributes(attrs_part: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    let mut chars = attrs_part.chars().peekable();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_value = false;

    let mut flush = |key: &mut String, value: &mut String| {
        let key_clean = key.trim().to_lowercase();
        if !key_clean.is_empty() {
            attributes.insert(key_clean, value.trim().to_string());
        }
        key.clear();
        value.clear();
    };

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' if !in_quotes => {
                if in_value {
                    flush(&mut current_key, &mut current_value);
                    in_value = false;
                } else {
                    // A token without '=' (duration, stray word)
                    current_key.clear();
                }
            }
            '=' if !in_value => {
                in_value = true;
                if chars.peek() == Some(&'"') {
                    chars.next();
                    in_quotes = true;
                }
            }
            '"' if in_quotes => {
                in_quotes = false;
                in_value = false;
                flush(&mut current_key, &mut current_value);
            }
            _ => {
                if in_value {
                    current_value.push(ch);
                } else {
                    current_key.push(ch);
                }
            }
        }
    }

    if in_value {
        flush(&mut current_key, &mut current_value);
    }

    attributes
}
