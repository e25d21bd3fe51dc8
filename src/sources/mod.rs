//! Input parsers producing raw entries
//!
//! - [`m3u`] reads bulk-import playlists
//! - [`channel_records`] reads and writes the persisted channel record file

pub mod channel_records;
pub mod m3u;

pub use channel_records::{parse_channel_records, render_channel_record, render_channel_records};
pub use m3u::{M3uParser, ParseStats, ParsedPlaylist};
