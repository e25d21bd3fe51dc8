use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persistent channel record file, rewritten after each run
    #[serde(default = "default_channels_file")]
    pub channels_file: PathBuf,
    /// Generated playlist
    #[serde(default = "default_playlist_file")]
    pub playlist_file: PathBuf,
    /// Bulk import playlists merged into the channel records
    #[serde(default = "default_import_files")]
    pub import_files: Vec<PathBuf>,
    /// Country/quality pattern file (`.toml` or `.json`)
    #[serde(default = "default_patterns_file")]
    pub patterns_file: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
    #[serde(default = "default_max_reports")]
    pub max_reports: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default = "default_remove_duplicates")]
    pub remove_duplicates: bool,
    #[serde(default = "default_detect_quality")]
    pub detect_quality: bool,
    /// Add a ` [HD]` style tag to playlist titles
    #[serde(default = "default_append_quality_tag")]
    pub append_quality_tag: bool,
    #[serde(default = "default_skip_adult_content")]
    pub skip_adult_content: bool,
    #[serde(default = "default_min_channel_name_length")]
    pub min_channel_name_length: usize,
    /// Delete import files once their entries are merged
    #[serde(default = "default_auto_cleanup_import")]
    pub auto_cleanup_import: bool,
    #[serde(default = "default_create_backup")]
    pub create_backup: bool,
    /// Empty means any scheme with a host is accepted
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,
    #[serde(default = "default_max_rejections_in_report")]
    pub max_rejections_in_report: usize,
}

fn default_channels_file() -> PathBuf { PathBuf::from(DEFAULT_CHANNELS_FILE) }
fn default_playlist_file() -> PathBuf { PathBuf::from(DEFAULT_PLAYLIST_FILE) }
fn default_import_files() -> Vec<PathBuf> { vec![PathBuf::from(DEFAULT_IMPORT_FILE)] }
fn default_patterns_file() -> PathBuf { PathBuf::from(DEFAULT_PATTERNS_FILE) }
fn default_backup_dir() -> PathBuf { PathBuf::from(DEFAULT_BACKUP_DIR) }
fn default_report_dir() -> PathBuf { PathBuf::from(DEFAULT_REPORT_DIR) }
fn default_max_backups() -> usize { DEFAULT_MAX_BACKUPS }
fn default_max_reports() -> usize { DEFAULT_MAX_REPORTS }
fn default_remove_duplicates() -> bool { DEFAULT_REMOVE_DUPLICATES }
fn default_detect_quality() -> bool { DEFAULT_DETECT_QUALITY }
fn default_append_quality_tag() -> bool { DEFAULT_APPEND_QUALITY_TAG }
fn default_skip_adult_content() -> bool { DEFAULT_SKIP_ADULT_CONTENT }
fn default_min_channel_name_length() -> usize { DEFAULT_MIN_CHANNEL_NAME_LENGTH }
fn default_auto_cleanup_import() -> bool { DEFAULT_AUTO_CLEANUP_IMPORT }
fn default_create_backup() -> bool { DEFAULT_CREATE_BACKUP }
fn default_allowed_schemes() -> Vec<String> {
    DEFAULT_ALLOWED_SCHEMES.iter().map(|s| s.to_string()).collect()
}
fn default_max_rejections_in_report() -> usize { DEFAULT_MAX_REJECTIONS_IN_REPORT }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            channels_file: default_channels_file(),
            playlist_file: default_playlist_file(),
            import_files: default_import_files(),
            patterns_file: default_patterns_file(),
            backup_dir: default_backup_dir(),
            report_dir: default_report_dir(),
            max_backups: default_max_backups(),
            max_reports: default_max_reports(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: default_remove_duplicates(),
            detect_quality: default_detect_quality(),
            append_quality_tag: default_append_quality_tag(),
            skip_adult_content: default_skip_adult_content(),
            min_channel_name_length: default_min_channel_name_length(),
            auto_cleanup_import: default_auto_cleanup_import(),
            create_backup: default_create_backup(),
            allowed_schemes: default_allowed_schemes(),
            max_rejections_in_report: default_max_rejections_in_report(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load `config_file` layered under `M3U_CURATOR__*` environment variables
    ///
    /// A missing file is created with the defaults so users have something to
    /// edit on the next run.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let path = config_file.as_ref();

        if !path.exists() {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
            info!("Created default config file: {}", path.display());
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("processing.allowed_schemes")
                    .with_list_parse_key("storage.import_files")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        let config: Config = settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from_file(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.processing.min_channel_name_length, DEFAULT_MIN_CHANNEL_NAME_LENGTH);
        assert_eq!(config.storage.channels_file, PathBuf::from(DEFAULT_CHANNELS_FILE));
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[processing]\nremove_duplicates = false\nmin_channel_name_length = 3\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert!(!config.processing.remove_duplicates);
        assert_eq!(config.processing.min_channel_name_length, 3);
        assert!(config.processing.skip_adult_content);
        assert_eq!(config.storage.max_backups, DEFAULT_MAX_BACKUPS);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nmin_channel_name_length = \"lots\"\n").unwrap();

        assert!(Config::load_from_file(&path).is_err());
    }
}
