use chrono::{Local, TimeZone};
use m3u_curator::config::Config;
use m3u_curator::models::Quality;
use m3u_curator::patterns::{OverrideRule, PatternRegistry, PatternsConfig};
use m3u_curator::services::CurationService;
use m3u_curator::sources::parse_channel_records;
use std::path::Path;
use tempfile::TempDir;

const IMPORT: &str = "#EXTM3U
#EXTINF:-1 tvg-id=\"bbc1.uk\" tvg-logo=\"http://logo/bbc1.png\",BBC One HD
http://example.com/bbc1.m3u8
#EXTINF:-1,bbc one hd
http://example.com/bbc1.m3u8?token=abc
#EXTINF:-1,Mystery Feed
http://example.com/mystery.ts
#EXTINF:-1,No Url Here
";

const RECORDS: &str = "Group = Canada
Stream name = CBC News
Logo =
EPG id = cbc.ca
Stream URL = http://example.com/cbc.m3u8
";

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.channels_file = dir.join("channels.txt");
    config.storage.playlist_file = dir.join("playlist.m3u");
    config.storage.import_files = vec![dir.join("bulk_import.m3u")];
    config.storage.patterns_file = dir.join("config").join("patterns.toml");
    config.storage.backup_dir = dir.join("backups");
    config.storage.report_dir = dir.join("reports");
    config
}

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("channels.txt"), RECORDS).unwrap();
    std::fs::write(dir.join("bulk_import.m3u"), IMPORT).unwrap();
}

#[test]
fn test_full_run_writes_all_outputs() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let service = CurationService::from_config(config_in(dir.path())).unwrap();

    let now = Local.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap();
    let summary = service.run_at(false, now).unwrap();

    assert_eq!(summary.stats.input_entries, 5);
    assert_eq!(summary.stats.total_entries, 3);
    assert_eq!(summary.stats.duplicates_removed, 1);
    assert_eq!(summary.stats.rejected, 1);
    assert!(summary.stats.is_balanced());
    assert_eq!(summary.import_stats.missing_urls, 1);

    // Pattern file created with defaults
    assert!(dir.path().join("config").join("patterns.toml").exists());

    // Channel records rewritten in grouped order, catch-all last
    let records = std::fs::read_to_string(dir.path().join("channels.txt")).unwrap();
    let countries: Vec<&str> = records
        .lines()
        .filter_map(|line| line.strip_prefix("Country = "))
        .collect();
    assert_eq!(countries, vec!["Canada", "United Kingdom", "Uncategorized"]);
    let reloaded = parse_channel_records(&records);
    // Group hints survive the rewrite
    assert_eq!(reloaded[0].group, "Canada");
    assert_eq!(reloaded[1].group, "");
    assert_eq!(reloaded[1].epg_id, "bbc1.uk");

    // Playlist
    let playlist = std::fs::read_to_string(dir.path().join("playlist.m3u")).unwrap();
    assert!(playlist.starts_with("#EXTM3U\n"));
    assert_eq!(playlist.matches("#EXTINF").count(), 3);
    assert!(playlist.contains("group-title=\"United Kingdom\" tvg-name=\"BBC One HD\",BBC One HD\n"));
    assert!(playlist.contains(",CBC News\n"));

    // Backup of the previous channel records
    let backup = summary.backup_file.clone().unwrap();
    assert_eq!(
        backup.file_name().unwrap().to_string_lossy(),
        "channels_20240601_081500.txt"
    );
    assert_eq!(std::fs::read_to_string(backup).unwrap(), RECORDS);

    // Reports
    let report = std::fs::read_to_string(summary.report_file.clone().unwrap()).unwrap();
    assert!(report.contains("- **Duplicates removed:** 1"));
    assert!(report.contains("missing_stream_url"));
    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(summary.stats_file.clone().unwrap()).unwrap())
            .unwrap();
    assert_eq!(stats["stats"]["total_entries"], 3);

    // Import consumed
    assert!(!dir.path().join("bulk_import.m3u").exists());
    assert_eq!(summary.removed_imports.len(), 1);
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let config = config_in(dir.path());
    let service = CurationService::new(config, PatternRegistry::with_defaults().unwrap());

    let summary = service.run(true).unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.stats.total_entries, 3);
    assert!(summary.playlist_file.is_none());
    assert!(!dir.path().join("playlist.m3u").exists());
    assert!(!dir.path().join("backups").exists());
    assert!(!dir.path().join("reports").exists());
    assert!(dir.path().join("bulk_import.m3u").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("channels.txt")).unwrap(),
        RECORDS
    );
}

#[test]
fn test_second_run_is_stable() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let mut config = config_in(dir.path());
    config.processing.create_backup = false;
    let service = CurationService::new(config, PatternRegistry::with_defaults().unwrap());

    service.run(false).unwrap();
    let first = std::fs::read_to_string(dir.path().join("channels.txt")).unwrap();

    let summary = service.run(false).unwrap();
    let second = std::fs::read_to_string(dir.path().join("channels.txt")).unwrap();

    assert_eq!(first, second);
    assert_eq!(summary.stats.duplicates_removed, 0);
    assert_eq!(summary.stats.rejected, 0);
    assert!(summary.processed_imports.is_empty());
}

#[test]
fn test_group_dependent_classification_survives_rewrite() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bulk_import.m3u"),
        "#EXTM3U
#EXTINF:-1 group-title=\"4K Movies\",Cinema One
http://example.com/cinema1.m3u8
#EXTINF:-1 group-title=\"Sports MX\",ESPN
http://example.com/espn-mx.m3u8
",
    )
    .unwrap();

    let mut patterns = PatternsConfig::default();
    patterns.overrides.push(OverrideRule {
        channel: "ESPN".to_string(),
        group: None,
        country: "United States".to_string(),
    });
    patterns.overrides.push(OverrideRule {
        channel: "ESPN".to_string(),
        group: Some("Sports MX".to_string()),
        country: "Mexico".to_string(),
    });
    let mut config = config_in(dir.path());
    config.processing.create_backup = false;
    let service = CurationService::new(config, PatternRegistry::from_config(&patterns).unwrap());

    let first = service.run(false).unwrap();
    assert_eq!(first.stats.per_quality.get(&Quality::Uhd4k), Some(&1));
    assert_eq!(first.stats.per_country.get("Mexico"), Some(&1));

    let second = service.run(false).unwrap();
    assert!(second.processed_imports.is_empty());
    assert_eq!(second.stats.per_quality, first.stats.per_quality);
    assert_eq!(second.stats.per_country, first.stats.per_country);

    let records = std::fs::read_to_string(dir.path().join("channels.txt")).unwrap();
    assert!(records.contains("Group = Sports MX\nCountry = Mexico\nStream name = ESPN\n"));
}

#[test]
fn test_missing_inputs_produce_empty_outputs() {
    let dir = TempDir::new().unwrap();
    let service = CurationService::new(
        config_in(dir.path()),
        PatternRegistry::with_defaults().unwrap(),
    );

    let summary = service.run(false).unwrap();

    assert_eq!(summary.stats.input_entries, 0);
    assert!(summary.backup_file.is_none());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("playlist.m3u")).unwrap(),
        "#EXTM3U\n"
    );
}

#[test]
fn test_invalid_pattern_file_aborts() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let config = config_in(dir.path());
    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(
        &config.storage.patterns_file,
        "catch_all_label = \"\"\n",
    )
    .unwrap();

    assert!(CurationService::from_config(config).is_err());
    assert!(!dir.path().join("playlist.m3u").exists());
}
