use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ChannelEntry, Quality, RawEntry};
use crate::errors::ValidationError;

/// A raw entry the normalizer refused, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    pub raw: RawEntry,
    pub reason: ValidationError,
}

impl RejectedEntry {
    /// Short human label for reports: the raw name, or the source text when
    /// the name is blank
    pub fn display_name(&self) -> String {
        let name = self.raw.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        self.raw
            .source_text
            .as_deref()
            .and_then(|text| text.lines().next())
            .map(|line| line.chars().take(60).collect())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// All surviving entries of one resolved country
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryGroup {
    pub country: String,
    pub entries: Vec<ChannelEntry>,
}

/// Summary counters for one run
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProcessingStats {
    /// Raw entries handed to the pipeline
    pub input_entries: usize,
    /// Entries in the final grouped output
    pub total_entries: usize,
    pub per_country: BTreeMap<String, usize>,
    pub per_quality: BTreeMap<Quality, usize>,
    pub duplicates_removed: usize,
    pub rejected: usize,
    pub rejected_by_reason: BTreeMap<String, usize>,
}

impl ProcessingStats {
    /// Every input entry is accounted for as survivor, duplicate or rejection
    pub fn is_balanced(&self) -> bool {
        self.input_entries == self.total_entries + self.duplicates_removed + self.rejected
    }

    pub fn countries_detected(&self) -> usize {
        self.per_country.len()
    }
}

/// Grouped, ordered output of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct ProcessingResult {
    pub groups: Vec<CountryGroup>,
    pub stats: ProcessingStats,
    pub rejections: Vec<RejectedEntry>,
}

impl ProcessingResult {
    /// Entries in final order, group by group
    pub fn entries(&self) -> impl Iterator<Item = &ChannelEntry> {
        self.groups.iter().flat_map(|group| group.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_source_text() {
        let rejected = RejectedEntry {
            raw: RawEntry {
                source_text: Some("#EXTINF:-1,\nhttp://x.com/a".to_string()),
                ..Default::default()
            },
            reason: ValidationError::MissingName,
        };
        assert_eq!(rejected.display_name(), "#EXTINF:-1,");
    }

    #[test]
    fn test_stats_balance() {
        let stats = ProcessingStats {
            input_entries: 10,
            total_entries: 6,
            duplicates_removed: 3,
            rejected: 1,
            ..Default::default()
        };
        assert!(stats.is_balanced());
    }
}
