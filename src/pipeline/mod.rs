//! Channel processing pipeline
//!
//! raw entries → [`Normalizer`] → [`Classifier`] → [`deduplicate`] →
//! [`Aggregator`] → [`ProcessingResult`]
//!
//! Normalization and classification are per-entry, so independent input
//! shards can be prepared separately. Deduplication and aggregation need every
//! entry at once and run a single time over the concatenated shards.

use tracing::info;

use crate::config::ProcessingConfig;
use crate::models::{ChannelEntry, ProcessingResult, RawEntry, RejectedEntry};
use crate::patterns::PatternRegistry;

pub mod aggregator;
pub mod classifier;
pub mod deduplicator;
pub mod normalizer;

pub use aggregator::{Aggregation, Aggregator, UpstreamCounts};
pub use classifier::{Classification, Classifier, CountryMatch};
pub use deduplicator::{deduplicate, DedupOutcome};
pub use normalizer::{Normalizer, NormalizerConfig};

/// Normalized and classified entries of one shard
#[derive(Debug, Clone, Default)]
pub struct PreparedShard {
    pub input_entries: usize,
    pub entries: Vec<ChannelEntry>,
    pub rejections: Vec<RejectedEntry>,
}

impl PreparedShard {
    /// Concatenate shards in order
    pub fn merge(shards: Vec<PreparedShard>) -> PreparedShard {
        shards
            .into_iter()
            .fold(PreparedShard::default(), |mut acc, shard| {
                acc.input_entries += shard.input_entries;
                acc.entries.extend(shard.entries);
                acc.rejections.extend(shard.rejections);
                acc
            })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub normalizer: NormalizerConfig,
    pub detect_quality: bool,
    pub remove_duplicates: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            detect_quality: true,
            remove_duplicates: true,
        }
    }
}

impl From<&ProcessingConfig> for PipelineOptions {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            normalizer: NormalizerConfig::from(config),
            detect_quality: config.detect_quality,
            remove_duplicates: config.remove_duplicates,
        }
    }
}

pub struct ChannelPipeline<'a> {
    registry: &'a PatternRegistry,
    options: PipelineOptions,
}

impl<'a> ChannelPipeline<'a> {
    pub fn new(registry: &'a PatternRegistry, options: PipelineOptions) -> Self {
        Self { registry, options }
    }

    /// Normalize and classify one shard
    pub fn prepare_shard(&self, raw_entries: Vec<RawEntry>) -> PreparedShard {
        let input_entries = raw_entries.len();
        let normalizer = Normalizer::new(self.options.normalizer.clone(), self.registry);
        let classifier =
            Classifier::new(self.registry).with_quality_detection(self.options.detect_quality);

        let (normalized, rejections) = normalizer.normalize_all(raw_entries);
        let entries = normalized
            .into_iter()
            .map(|entry| classifier.apply(entry))
            .collect();

        PreparedShard {
            input_entries,
            entries,
            rejections,
        }
    }

    /// Deduplicate and aggregate already prepared shards
    pub fn finish(&self, prepared: PreparedShard) -> ProcessingResult {
        let PreparedShard {
            input_entries,
            entries,
            rejections,
        } = prepared;

        let outcome = if self.options.remove_duplicates {
            deduplicate(entries)
        } else {
            DedupOutcome {
                survivors: entries,
                merged_count: 0,
            }
        };

        let aggregation = Aggregator::new(self.registry.catch_all_label()).aggregate(
            outcome.survivors,
            &rejections,
            UpstreamCounts {
                input_entries,
                duplicates_removed: outcome.merged_count,
            },
        );

        info!(
            "Processed {} entries: {} kept in {} groups, {} duplicates merged, {} rejected",
            aggregation.stats.input_entries,
            aggregation.stats.total_entries,
            aggregation.groups.len(),
            aggregation.stats.duplicates_removed,
            aggregation.stats.rejected
        );

        ProcessingResult {
            groups: aggregation.groups,
            stats: aggregation.stats,
            rejections,
        }
    }

    pub fn run(&self, raw_entries: Vec<RawEntry>) -> ProcessingResult {
        self.finish(self.prepare_shard(raw_entries))
    }

    /// Prepare each shard on its own, then one global dedup and aggregation
    pub fn run_shards(&self, shards: Vec<Vec<RawEntry>>) -> ProcessingResult {
        let prepared = shards
            .into_iter()
            .map(|shard| self.prepare_shard(shard))
            .collect();
        self.finish(PreparedShard::merge(prepared))
    }
}
