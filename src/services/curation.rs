//! One curation run over the configured files
//!
//! channel records + import playlists → pipeline → channel records, playlist,
//! Markdown report and JSON stats.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::generator::{PlaylistGenerator, ReportGenerator};
use crate::models::{ProcessingResult, ProcessingStats, RawEntry};
use crate::patterns::{PatternRegistry, PatternsConfig};
use crate::pipeline::{ChannelPipeline, PipelineOptions};
use crate::sources::{parse_channel_records, render_channel_records, M3uParser, ParseStats};
use crate::storage::{cleanup_old_versions, timestamped_file_name, ChannelStore};

pub const REPORT_STEM: &str = "report";
pub const STATS_STEM: &str = "stats";

/// What a run did, or would have done in dry-run mode
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub stats: ProcessingStats,
    pub import_stats: ParseStats,
    /// Import files that contributed at least one entry
    pub processed_imports: Vec<PathBuf>,
    pub backup_file: Option<PathBuf>,
    pub channels_file: Option<PathBuf>,
    pub playlist_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub removed_imports: Vec<PathBuf>,
}

/// Raw input of one run: one shard per file
#[derive(Debug, Clone, Default)]
pub struct LoadedInputs {
    pub shards: Vec<Vec<RawEntry>>,
    pub import_stats: ParseStats,
    pub processed_imports: Vec<PathBuf>,
}

pub struct CurationService {
    config: Config,
    registry: PatternRegistry,
    store: ChannelStore,
}

impl CurationService {
    pub fn new(config: Config, registry: PatternRegistry) -> Self {
        let store = ChannelStore::from_config(&config.storage);
        Self {
            config,
            registry,
            store,
        }
    }

    /// Load the pattern file named in the config (creating it when missing)
    /// and build the registry; any configuration problem aborts here
    pub fn from_config(config: Config) -> AppResult<Self> {
        let patterns = PatternsConfig::load_or_create(&config.storage.patterns_file)?;
        let registry = PatternRegistry::from_config(&patterns)?;
        info!("{}", registry.summary());
        Ok(Self::new(config, registry))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Read the channel record file and every import playlist
    pub fn load_inputs(&self) -> AppResult<LoadedInputs> {
        let storage = &self.config.storage;
        let mut inputs = LoadedInputs::default();

        let records = self.store.read_text(&storage.channels_file)?;
        inputs.shards.push(parse_channel_records(&records));

        let parser = M3uParser::new()?;
        for import_file in &storage.import_files {
            let content = self.store.read_text(import_file)?;
            if content.trim().is_empty() {
                debug!("No import entries in {}", import_file.display());
                continue;
            }

            let parsed = parser.parse(&content);
            info!(
                "Importing {} entries from {}",
                parsed.entries.len(),
                import_file.display()
            );
            inputs.import_stats.absorb(&parsed.stats);
            if !parsed.entries.is_empty() {
                inputs.processed_imports.push(import_file.clone());
            }
            inputs.shards.push(parsed.entries);
        }

        Ok(inputs)
    }

    /// Run the pipeline without touching any file
    pub fn process(&self, inputs: LoadedInputs) -> ProcessingResult {
        let options = PipelineOptions::from(&self.config.processing);
        ChannelPipeline::new(&self.registry, options).run_shards(inputs.shards)
    }

    pub fn run(&self, dry_run: bool) -> AppResult<RunSummary> {
        self.run_at(dry_run, Local::now())
    }

    /// One complete run; `now` names the backup and report files
    pub fn run_at(&self, dry_run: bool, now: DateTime<Local>) -> AppResult<RunSummary> {
        let inputs = self.load_inputs()?;
        let import_stats = inputs.import_stats.clone();
        let processed_imports = inputs.processed_imports.clone();
        let result = self.process(inputs);

        let mut summary = RunSummary {
            dry_run,
            stats: result.stats.clone(),
            import_stats,
            processed_imports,
            ..Default::default()
        };

        if dry_run {
            info!(
                "Dry run: {} channels would be written, nothing changed on disk",
                result.stats.total_entries
            );
            return Ok(summary);
        }

        self.write_outputs(&result, now, &mut summary)?;

        if self.config.processing.auto_cleanup_import {
            for import_file in &summary.processed_imports {
                if self.store.remove_file(import_file)? {
                    summary.removed_imports.push(import_file.clone());
                }
            }
        }

        info!(
            "Run complete: {} channels in {} countries ({} duplicates removed, {} rejected)",
            summary.stats.total_entries,
            summary.stats.countries_detected(),
            summary.stats.duplicates_removed,
            summary.stats.rejected
        );
        Ok(summary)
    }

    fn write_outputs(
        &self,
        result: &ProcessingResult,
        now: DateTime<Local>,
        summary: &mut RunSummary,
    ) -> AppResult<()> {
        let storage = &self.config.storage;
        let processing = &self.config.processing;

        if processing.create_backup {
            summary.backup_file = self.store.create_backup_at(&storage.channels_file, now)?;
        }

        self.store
            .write_atomic(&storage.channels_file, &render_channel_records(result.entries()))?;
        summary.channels_file = Some(storage.channels_file.clone());

        let playlist = PlaylistGenerator::new(processing.append_quality_tag).generate(result);
        self.store.write_atomic(&storage.playlist_file, &playlist)?;
        summary.playlist_file = Some(storage.playlist_file.clone());

        let generated_at = now.with_timezone(&Utc);
        let reports = ReportGenerator::new(processing);

        let report_path = storage
            .report_dir
            .join(timestamped_file_name(REPORT_STEM, ".md", now));
        let markdown = reports.render_markdown(result, &summary.import_stats, generated_at);
        self.store.write_atomic(&report_path, &markdown)?;
        info!("Report saved: {}", report_path.display());
        summary.report_file = Some(report_path);

        let stats_path = storage
            .report_dir
            .join(timestamped_file_name(STATS_STEM, ".json", now));
        let json = reports.render_json_stats(&result.stats, &summary.import_stats, generated_at)?;
        self.store.write_atomic(&stats_path, &json)?;
        summary.stats_file = Some(stats_path);

        rotate_reports(&storage.report_dir, storage.max_reports);
        Ok(())
    }
}

fn rotate_reports(report_dir: &Path, max_reports: usize) {
    for (stem, extension) in [(REPORT_STEM, ".md"), (STATS_STEM, ".json")] {
        if let Err(e) = cleanup_old_versions(report_dir, stem, extension, max_reports) {
            warn!("Could not clean up old reports: {}", e);
        }
    }
}
