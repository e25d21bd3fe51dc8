//! Persistent channel record file
//!
//! Plain text, one block per channel, blocks separated by blank lines:
//!
//! ```text
//! Group = UK HD
//! Country = United Kingdom
//! Stream name = BBC One HD
//! Logo = http://logo/bbc1.png
//! EPG id = bbc1.uk
//! Stream URL = http://example.com/bbc1.m3u8
//! ```
//!
//! `Group` keeps the group hint the channel arrived with, so quality tiers and
//! group-scoped overrides resolve the same way on every run. `Country` is the
//! country resolved on the previous run; it is written for readers and ignored
//! on reload, the classifier decides the country again.

use tracing::{debug, info};

use crate::models::{ChannelEntry, EntryOrigin, RawEntry};

pub const GROUP_KEY: &str = "Group";
pub const COUNTRY_KEY: &str = "Country";
pub const NAME_KEY: &str = "Stream name";
pub const LOGO_KEY: &str = "Logo";
pub const EPG_ID_KEY: &str = "EPG id";
pub const STREAM_URL_KEY: &str = "Stream URL";

/// Parse every block of a channel record file
///
/// Keys are matched case-insensitively, unknown keys are ignored and blocks
/// without any `key = value` line are skipped.
pub fn parse_channel_records(content: &str) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty() {
                if let Some(entry) = parse_block(&block) {
                    entries.push(entry);
                } else {
                    debug!("Skipping channel block without fields: {:?}", block);
                }
                block.clear();
            }
            continue;
        }
        block.push(line);
    }

    info!("Loaded {} channel records", entries.len());
    entries
}

fn parse_block(lines: &[&str]) -> Option<RawEntry> {
    let mut entry = RawEntry {
        origin: EntryOrigin::ChannelRecords,
        source_text: Some(lines.join("\n")),
        ..Default::default()
    };
    let mut has_field = false;

    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        has_field = true;

        let key = key.trim();
        let value = value.trim().to_string();
        if key.eq_ignore_ascii_case(GROUP_KEY) {
            entry.group = value;
        } else if key.eq_ignore_ascii_case(NAME_KEY) {
            entry.name = value;
        } else if key.eq_ignore_ascii_case(LOGO_KEY) {
            entry.logo_url = value;
        } else if key.eq_ignore_ascii_case(EPG_ID_KEY) {
            entry.epg_id = value;
        } else if key.eq_ignore_ascii_case(STREAM_URL_KEY) {
            entry.stream_url = value;
        }
    }

    has_field.then_some(entry)
}

/// Render one channel as a record block (no trailing newline)
pub fn render_channel_record(entry: &ChannelEntry) -> String {
    [
        format!("{GROUP_KEY} = {}", entry.group),
        format!("{COUNTRY_KEY} = {}", entry.country),
        format!("{NAME_KEY} = {}", entry.name),
        format!("{LOGO_KEY} = {}", entry.logo_url),
        format!("{EPG_ID_KEY} = {}", entry.epg_id),
        format!("{STREAM_URL_KEY} = {}", entry.stream_url),
    ]
    .join("\n")
}

/// Render channels in the given order, blocks separated by one blank line
pub fn render_channel_records<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a ChannelEntry>,
{
    let blocks: Vec<String> = entries.into_iter().map(render_channel_record).collect();
    if blocks.is_empty() {
        return String::new();
    }

    let mut content = blocks.join("\n\n");
    content.push('\n');
    content
}
