//! Quality and country classification
//!
//! Both decisions are first-match-wins walks over ordered rule tables and are
//! pure functions of `(name, group, registry)`.
//!
//! Country precedence:
//! 1. override map (`name|group`, then `name`)
//! 2. structural prefix code at the start of the name
//! 3. keyword lists in declaration order, matched against the name
//! 4. catch-all label

use tracing::trace;

use crate::models::{ChannelEntry, NormalizedEntry, Quality};
use crate::patterns::PatternRegistry;

/// Which strategy resolved the country, useful for logs and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryMatch {
    Override,
    Prefix { code: String },
    Keyword { keyword: String },
    CatchAll,
}

/// Result of classifying one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub quality: Quality,
    pub country: String,
    pub matched_by: CountryMatch,
}

pub struct Classifier<'a> {
    registry: &'a PatternRegistry,
    detect_quality: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self {
            registry,
            detect_quality: true,
        }
    }

    /// With detection off every entry is classified as `Quality::Unknown`
    pub fn with_quality_detection(mut self, enabled: bool) -> Self {
        self.detect_quality = enabled;
        self
    }

    pub fn classify(&self, name: &str, group: &str) -> Classification {
        let quality = if self.detect_quality {
            self.detect_quality(name, group)
        } else {
            Quality::Unknown
        };
        let (country, matched_by) = self.detect_country(name, group);

        Classification {
            quality,
            country,
            matched_by,
        }
    }

    /// Name evidence outranks group evidence; within one field the highest
    /// tier wins
    pub fn detect_quality(&self, name: &str, group: &str) -> Quality {
        self.registry
            .match_quality(name)
            .or_else(|| self.registry.match_quality(group))
            .unwrap_or(Quality::Unknown)
    }

    pub fn detect_country(&self, name: &str, group: &str) -> (String, CountryMatch) {
        if let Some(label) = self.registry.lookup_override(name, group) {
            return (label.to_string(), CountryMatch::Override);
        }

        if let Some((label, code)) = self.registry.lookup_prefix(name) {
            return (label.to_string(), CountryMatch::Prefix { code });
        }

        if let Some((label, keyword)) = self.registry.match_country_keyword(name) {
            return (
                label.to_string(),
                CountryMatch::Keyword {
                    keyword: keyword.to_string(),
                },
            );
        }

        (
            self.registry.catch_all_label().to_string(),
            CountryMatch::CatchAll,
        )
    }

    /// Attach quality and country to a normalized entry
    pub fn apply(&self, entry: NormalizedEntry) -> ChannelEntry {
        let classification = self.classify(&entry.name, &entry.group);
        trace!(
            "Classified '{}' as {} / {} ({:?})",
            entry.name,
            classification.quality,
            classification.country,
            classification.matched_by
        );

        ChannelEntry {
            name: entry.name,
            group: entry.group,
            logo_url: entry.logo_url,
            epg_id: entry.epg_id,
            stream_url: entry.stream_url,
            origin: entry.origin,
            signature: entry.signature,
            quality: classification.quality,
            country: classification.country,
        }
    }
}
