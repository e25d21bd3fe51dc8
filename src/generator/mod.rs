//! Output rendering: the playlist and the run reports

pub mod m3u;
pub mod report;

pub use m3u::PlaylistGenerator;
pub use report::{ReportGenerator, StatsExport};
