/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Storage defaults
pub const DEFAULT_CHANNELS_FILE: &str = "channels.txt";
pub const DEFAULT_PLAYLIST_FILE: &str = "playlist.m3u";
pub const DEFAULT_IMPORT_FILE: &str = "bulk_import.m3u";
pub const DEFAULT_PATTERNS_FILE: &str = "config/patterns.toml";
pub const DEFAULT_BACKUP_DIR: &str = "./backups";
pub const DEFAULT_REPORT_DIR: &str = "./reports";
pub const DEFAULT_MAX_BACKUPS: usize = 5;
pub const DEFAULT_MAX_REPORTS: usize = 10;

// Processing defaults
pub const DEFAULT_REMOVE_DUPLICATES: bool = true;
pub const DEFAULT_DETECT_QUALITY: bool = true;
pub const DEFAULT_APPEND_QUALITY_TAG: bool = true;
pub const DEFAULT_SKIP_ADULT_CONTENT: bool = true;
pub const DEFAULT_MIN_CHANNEL_NAME_LENGTH: usize = 2;
pub const DEFAULT_AUTO_CLEANUP_IMPORT: bool = true;
pub const DEFAULT_CREATE_BACKUP: bool = true;
pub const DEFAULT_MAX_REJECTIONS_IN_REPORT: usize = 25;
pub const DEFAULT_ALLOWED_SCHEMES: &[&str] = &["http", "https", "rtmp", "rtmps", "rtsp"];

// Classification defaults
pub const DEFAULT_CATCH_ALL_LABEL: &str = "Uncategorized";

// Environment
pub const ENV_PREFIX: &str = "M3U_CURATOR";
