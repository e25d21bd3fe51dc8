//! Grouping, ordering and run statistics

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{ChannelEntry, CountryGroup, ProcessingStats, RejectedEntry};

/// Counts produced upstream that the aggregator folds into the stats
#[derive(Debug, Clone, Default)]
pub struct UpstreamCounts {
    pub input_entries: usize,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub groups: Vec<CountryGroup>,
    pub stats: ProcessingStats,
}

pub struct Aggregator<'a> {
    catch_all_label: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(catch_all_label: &'a str) -> Self {
        Self { catch_all_label }
    }

    /// Alphabetical (case-insensitive) with the catch-all label always last
    fn compare_countries(&self, a: &str, b: &str) -> Ordering {
        let a_is_catch_all = a == self.catch_all_label;
        let b_is_catch_all = b == self.catch_all_label;

        a_is_catch_all
            .cmp(&b_is_catch_all)
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    }

    fn compare_entries(a: &ChannelEntry, b: &ChannelEntry) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.stream_url.cmp(&b.stream_url))
            .then_with(|| a.name.cmp(&b.name))
    }

    /// Partition by country and order everything; never fails
    pub fn aggregate(
        &self,
        entries: Vec<ChannelEntry>,
        rejections: &[RejectedEntry],
        upstream: UpstreamCounts,
    ) -> Aggregation {
        let mut stats = ProcessingStats {
            input_entries: upstream.input_entries,
            total_entries: entries.len(),
            duplicates_removed: upstream.duplicates_removed,
            rejected: rejections.len(),
            ..Default::default()
        };

        for rejection in rejections {
            *stats
                .rejected_by_reason
                .entry(rejection.reason.kind().to_string())
                .or_insert(0) += 1;
        }

        let mut by_country: HashMap<String, Vec<ChannelEntry>> = HashMap::new();
        for entry in entries {
            *stats.per_quality.entry(entry.quality).or_insert(0) += 1;
            by_country.entry(entry.country.clone()).or_default().push(entry);
        }

        let mut groups: Vec<CountryGroup> = by_country
            .into_iter()
            .map(|(country, mut entries)| {
                entries.sort_by(Self::compare_entries);
                CountryGroup { country, entries }
            })
            .collect();
        groups.sort_by(|a, b| self.compare_countries(&a.country, &b.country));

        stats.per_country = groups
            .iter()
            .map(|group| (group.country.clone(), group.entries.len()))
            .collect::<BTreeMap<_, _>>();

        Aggregation { groups, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use crate::models::{EntryOrigin, Quality, RawEntry, Signature};

    fn entry(name: &str, url: &str, country: &str, quality: Quality) -> ChannelEntry {
        ChannelEntry {
            name: name.to_string(),
            group: String::new(),
            logo_url: String::new(),
            epg_id: String::new(),
            stream_url: url.to_string(),
            origin: EntryOrigin::Manual,
            signature: Signature::compute(name, url),
            quality,
            country: country.to_string(),
        }
    }

    #[test]
    fn test_group_order_forces_catch_all_last() {
        let aggregator = Aggregator::new("Other");
        let aggregation = aggregator.aggregate(
            vec![
                entry("ZDF", "http://x/1", "Germany", Quality::Hd),
                entry("Mystery", "http://x/2", "Other", Quality::Unknown),
                entry("CBC", "http://x/3", "Canada", Quality::Sd),
            ],
            &[],
            UpstreamCounts::default(),
        );

        let order: Vec<&str> = aggregation.groups.iter().map(|g| g.country.as_str()).collect();
        assert_eq!(order, vec!["Canada", "Germany", "Other"]);
    }

    #[test]
    fn test_catch_all_last_even_when_alphabetically_first() {
        let aggregator = Aggregator::new("Amorphous");
        let aggregation = aggregator.aggregate(
            vec![
                entry("A", "http://x/1", "Amorphous", Quality::Hd),
                entry("B", "http://x/2", "zimbabwe", Quality::Hd),
                entry("C", "http://x/3", "Brazil", Quality::Hd),
            ],
            &[],
            UpstreamCounts::default(),
        );

        let order: Vec<&str> = aggregation.groups.iter().map(|g| g.country.as_str()).collect();
        assert_eq!(order, vec!["Brazil", "zimbabwe", "Amorphous"]);
    }

    #[test]
    fn test_entries_sorted_by_name_then_url() {
        let aggregator = Aggregator::new("Other");
        let aggregation = aggregator.aggregate(
            vec![
                entry("bbc two", "http://x/2", "United Kingdom", Quality::Hd),
                entry("BBC One", "http://x/9", "United Kingdom", Quality::Hd),
                entry("bbc one", "http://x/1", "United Kingdom", Quality::Hd),
            ],
            &[],
            UpstreamCounts::default(),
        );

        let urls: Vec<&str> = aggregation.groups[0]
            .entries
            .iter()
            .map(|e| e.stream_url.as_str())
            .collect();
        assert_eq!(urls, vec!["http://x/1", "http://x/9", "http://x/2"]);
    }

    #[test]
    fn test_stats() {
        let aggregator = Aggregator::new("Other");
        let rejections = vec![
            RejectedEntry {
                raw: RawEntry::new("", "http://x/0"),
                reason: ValidationError::MissingName,
            },
            RejectedEntry {
                raw: RawEntry::new("CNN", ""),
                reason: ValidationError::MissingStreamUrl,
            },
        ];

        let aggregation = aggregator.aggregate(
            vec![
                entry("ZDF", "http://x/1", "Germany", Quality::Hd),
                entry("ARD", "http://x/2", "Germany", Quality::Sd),
                entry("CBC", "http://x/3", "Canada", Quality::Hd),
            ],
            &rejections,
            UpstreamCounts {
                input_entries: 7,
                duplicates_removed: 2,
            },
        );

        let stats = aggregation.stats;
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.per_country.get("Germany"), Some(&2));
        assert_eq!(stats.per_country.get("Canada"), Some(&1));
        assert_eq!(stats.per_quality.get(&Quality::Hd), Some(&2));
        assert_eq!(stats.per_quality.get(&Quality::Sd), Some(&1));
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.rejected_by_reason.get("missing_name"), Some(&1));
        assert_eq!(stats.duplicates_removed, 2);
        assert!(stats.is_balanced());
    }
}
