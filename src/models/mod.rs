use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::utils::{text::normalize_key, url::canonicalize_for_signature};

pub mod processing;

pub use processing::*;

/// Where a raw entry came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Bulk-imported playlist (`#EXTINF` syntax)
    #[default]
    Import,
    /// The persisted channel record file
    ChannelRecords,
    /// Constructed programmatically
    Manual,
}

/// One unprocessed stream record as produced by a source parser
///
/// All fields may be empty or dirty; the normalizer decides whether the entry
/// survives.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawEntry {
    pub name: String,
    pub group: String,
    pub logo_url: String,
    pub epg_id: String,
    pub stream_url: String,
    pub origin: EntryOrigin,
    /// Original text the entry was parsed from, kept for rejection reports
    pub source_text: Option<String>,
}

impl RawEntry {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, stream_url: U) -> Self {
        Self {
            name: name.into(),
            stream_url: stream_url.into(),
            origin: EntryOrigin::Manual,
            ..Default::default()
        }
    }

    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_logo<S: Into<String>>(mut self, logo_url: S) -> Self {
        self.logo_url = logo_url.into();
        self
    }

    pub fn with_epg_id<S: Into<String>>(mut self, epg_id: S) -> Self {
        self.epg_id = epg_id.into();
        self
    }

    pub fn with_origin(mut self, origin: EntryOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// Coarse stream resolution classification
///
/// Variants are declared in rank order so the derived `Ord` is the
/// deduplication tie-break order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
)]
#[strum(ascii_case_insensitive)]
pub enum Quality {
    #[default]
    #[serde(rename = "UNKNOWN")]
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    #[serde(rename = "SD")]
    #[strum(serialize = "SD")]
    Sd,
    #[serde(rename = "HD")]
    #[strum(serialize = "HD")]
    Hd,
    #[serde(rename = "FHD")]
    #[strum(serialize = "FHD")]
    Fhd,
    #[serde(rename = "4K", alias = "UHD4K")]
    #[strum(to_string = "4K", serialize = "UHD4K", serialize = "UHD")]
    Uhd4k,
}

impl Quality {
    /// Tag shown next to channel names, `None` when the quality is unknown
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Quality::Unknown => None,
            Quality::Sd => Some("SD"),
            Quality::Hd => Some("HD"),
            Quality::Fhd => Some("FHD"),
            Quality::Uhd4k => Some("4K"),
        }
    }
}

/// Normalized (name, stream URL) identity used to detect duplicates
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Lower-cased, whitespace-collapsed name joined with the canonical URL
    ///
    /// Only the name and URL go in; quality, country, logo and EPG id never
    /// affect the result.
    pub fn compute(name: &str, stream_url: &str) -> Self {
        Signature(format!(
            "{}|{}",
            normalize_key(name),
            canonicalize_for_signature(stream_url)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry that passed validation but has not been classified yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedEntry {
    pub name: String,
    pub group: String,
    pub logo_url: String,
    pub epg_id: String,
    pub stream_url: String,
    pub origin: EntryOrigin,
    pub signature: Signature,
}

/// A fully classified channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelEntry {
    pub name: String,
    pub group: String,
    pub logo_url: String,
    pub epg_id: String,
    pub stream_url: String,
    pub origin: EntryOrigin,
    pub signature: Signature,
    pub quality: Quality,
    pub country: String,
}

impl ChannelEntry {
    /// Number of non-empty optional metadata fields (logo, EPG id)
    pub fn metadata_richness(&self) -> usize {
        [&self.logo_url, &self.epg_id]
            .iter()
            .filter(|value| !value.is_empty())
            .count()
    }
}
