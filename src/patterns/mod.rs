//! Country and quality detection patterns
//!
//! [`PatternsConfig`] is the persisted, user-editable form (TOML or JSON).
//! [`PatternRegistry`] is the validated, read-only lookup structure built from
//! it once per run.
//!
//! Country keyword lists are an ordered array on purpose: the first country
//! whose list matches a channel name wins, so declaration order is the
//! priority order.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::defaults::DEFAULT_CATCH_ALL_LABEL;
use crate::errors::{ConfigResult, ConfigurationError};

pub mod registry;

pub use registry::{CountryRule, PatternRegistry, RegistrySummary};

/// Keyword list for one country label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryPatterns {
    pub label: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Structural prefix codes (`uk:`, `[DE]`) for one country label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixCodes {
    pub label: String,
    pub codes: Vec<String>,
}

/// Keyword lists per quality tier, searched 4K first and SD last
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityPatterns {
    #[serde(default, rename = "uhd4k", alias = "4k")]
    pub uhd4k: Vec<String>,
    #[serde(default)]
    pub fhd: Vec<String>,
    #[serde(default)]
    pub hd: Vec<String>,
    #[serde(default)]
    pub sd: Vec<String>,
}

/// Forced country for a channel, bypassing all pattern detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverrideRule {
    /// Channel name, compared case- and whitespace-insensitively
    pub channel: String,
    /// Restrict the override to entries carrying this group hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternsConfig {
    #[serde(default = "default_catch_all_label")]
    pub catch_all_label: String,
    #[serde(default = "default_adult_keywords")]
    pub adult_keywords: Vec<String>,
    #[serde(default = "default_countries")]
    pub countries: Vec<CountryPatterns>,
    #[serde(default = "default_prefix_codes")]
    pub prefix_codes: Vec<PrefixCodes>,
    #[serde(default)]
    pub quality: QualityPatterns,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_catch_all_label() -> String {
    DEFAULT_CATCH_ALL_LABEL.to_string()
}

fn default_adult_keywords() -> Vec<String> {
    words(&[
        "xxx", "adult", "porn", "sex", "erotic", "playboy", "18+", "nude", "naked",
    ])
}

fn default_countries() -> Vec<CountryPatterns> {
    let table: &[(&str, &[&str])] = &[
        ("United States", &["cbs", "nbc", "abc", "fox", "espn", "cnn", "hbo", "usa", "america", "nfl"]),
        ("United Kingdom", &["bbc", "itv", "sky", "channel 4", "e4", "british", "premier league"]),
        ("Canada", &["cbc", "ctv", "global", "canada", "canadian", "tsn"]),
        ("Germany", &["ard", "zdf", "rtl", "sat.1", "pro7", "germany", "german"]),
        ("France", &["tf1", "france 2", "m6", "canal+", "france", "french"]),
        ("Spain", &["tve", "antena 3", "telecinco", "spain", "spanish"]),
        ("Italy", &["rai", "mediaset", "canale 5", "italy", "italian"]),
        ("Netherlands", &["npo", "rtl nl", "netherlands", "dutch", "holland"]),
        ("Brazil", &["globo", "band", "sbt", "brazil", "brasil"]),
        ("Argentina", &["telefe", "canal 13", "argentina"]),
        ("Mexico", &["televisa", "tv azteca", "mexico", "méxico"]),
        ("Australia", &["abc au", "seven", "nine", "australia", "australian"]),
        ("Japan", &["nhk", "fuji", "tv asahi", "animax", "japan", "japanese"]),
        ("Philippines", &["abs-cbn", "gma", "anc global", "philippines", "filipino"]),
        ("Arabic", &["al jazeera", "mbc", "lbc", "dubai tv", "arabic", "arab"]),
    ];

    table
        .iter()
        .map(|(label, keywords)| CountryPatterns {
            label: label.to_string(),
            keywords: words(keywords),
        })
        .collect()
}

fn default_prefix_codes() -> Vec<PrefixCodes> {
    let table: &[(&str, &[&str])] = &[
        ("United States", &["us", "usa"]),
        ("United Kingdom", &["uk", "gb"]),
        ("Canada", &["ca", "canada"]),
        ("Germany", &["de", "ger"]),
        ("France", &["fr", "france"]),
        ("Spain", &["es", "spain"]),
        ("Italy", &["it", "italy"]),
        ("Ukraine", &["ua", "ukraine"]),
        ("Poland", &["pl", "poland"]),
        ("Turkey", &["tr", "turkey"]),
        ("Malaysia", &["my", "malaysia"]),
        ("Australia", &["au", "australia"]),
    ];

    table
        .iter()
        .map(|(label, codes)| PrefixCodes {
            label: label.to_string(),
            codes: words(codes),
        })
        .collect()
}

impl Default for QualityPatterns {
    fn default() -> Self {
        Self {
            uhd4k: words(&["4k", "uhd", "2160p", "ultra hd"]),
            fhd: words(&["fhd", "1080p", "1080", "full hd"]),
            hd: words(&["hd", "720p", "720", "high definition"]),
            sd: words(&["sd", "480p", "360p", "standard"]),
        }
    }
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            catch_all_label: default_catch_all_label(),
            adult_keywords: default_adult_keywords(),
            countries: default_countries(),
            prefix_codes: default_prefix_codes(),
            quality: QualityPatterns::default(),
            overrides: Vec::new(),
        }
    }
}

impl PatternsConfig {
    /// Parse a pattern file, choosing JSON or TOML by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::unreadable(path, e))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&contents).map_err(|e| ConfigurationError::parse(path, e))
        } else {
            toml::from_str(&contents).map_err(|e| ConfigurationError::parse(path, e))
        }
    }

    /// Load the pattern file, writing the built-in defaults when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let patterns = Self::from_file(path)?;
            info!("Loaded detection patterns from {}", path.display());
            return Ok(patterns);
        }

        let defaults = Self::default();
        if let Err(e) = defaults.write_to(path) {
            warn!(
                "Could not write default pattern file {}: {}",
                path.display(),
                e
            );
        } else {
            info!("Created default pattern file: {}", path.display());
        }
        Ok(defaults)
    }

    fn write_to(&self, path: &Path) -> ConfigResult<()> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let contents = if is_json {
            serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::parse(path, e))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigurationError::parse(path, e))?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigurationError::unreadable(parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| ConfigurationError::unreadable(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toml_file_keeps_country_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(
            &path,
            r#"
catch_all_label = "Other"

[[countries]]
label = "Zambia"
keywords = ["znbc"]

[[countries]]
label = "Austria"
keywords = ["orf"]

[[overrides]]
channel = "ESPN"
country = "United States"
"#,
        )
        .unwrap();

        let patterns = PatternsConfig::from_file(&path).unwrap();

        assert_eq!(patterns.catch_all_label, "Other");
        let labels: Vec<&str> = patterns.countries.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Zambia", "Austria"]);
        assert_eq!(patterns.overrides.len(), 1);
        // Sections missing from the file fall back to built-ins
        assert_eq!(patterns.quality, QualityPatterns::default());
        assert!(!patterns.prefix_codes.is_empty());
    }

    #[test]
    fn test_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns.json");
        std::fs::write(
            &path,
            r#"{"countries": [{"label": "Canada", "keywords": ["cbc"]}], "quality": {"4k": ["4k"]}}"#,
        )
        .unwrap();

        let patterns = PatternsConfig::from_file(&path).unwrap();

        assert_eq!(patterns.countries.len(), 1);
        assert_eq!(patterns.quality.uhd4k, vec!["4k".to_string()]);
        assert!(patterns.quality.hd.is_empty());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("patterns.toml");

        let created = PatternsConfig::load_or_create(&path).unwrap();
        assert!(path.exists());

        let reloaded = PatternsConfig::from_file(&path).unwrap();
        assert_eq!(created, reloaded);
    }

    #[test]
    fn test_unparseable_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(&path, "countries = 12").unwrap();

        let err = PatternsConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { .. }));
    }
}
