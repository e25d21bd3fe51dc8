use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

use super::PatternsConfig;
use crate::errors::{ConfigResult, ConfigurationError};
use crate::models::Quality;
use crate::utils::text::normalize_key;

/// Leading country code: `[UK] …`, `(de) …`, `uk: …`, `US | …`
const PREFIX_PATTERN: &str =
    r"(?i)^\s*(?:\[\s*([a-z]{2,12})\s*\]|\(\s*([a-z]{2,12})\s*\)|([a-z]{2,12})\s*[:|])";

/// Ordered keyword list for one country, keywords lower-cased
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
struct QualityRule {
    quality: Quality,
    keywords: Vec<String>,
}

/// Read-only pattern snapshot for one run
///
/// Holds lookups only; the precedence between strategies lives in the
/// classifier.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    countries: Vec<CountryRule>,
    prefix_codes: HashMap<String, String>,
    quality_rules: Vec<QualityRule>,
    adult_keywords: Vec<String>,
    overrides: HashMap<String, String>,
    catch_all_label: String,
    prefix_regex: Regex,
}

/// Counts describing what a registry can detect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySummary {
    pub countries: usize,
    pub keywords: usize,
    pub prefix_codes: usize,
    pub quality_tiers: usize,
    pub adult_keywords: usize,
    pub overrides: usize,
}

impl fmt::Display for RegistrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Country detection: {} countries, {} keywords, {} prefix codes, {} overrides; \
             quality tiers: {}; adult keywords: {}",
            self.countries,
            self.keywords,
            self.prefix_codes,
            self.overrides,
            self.quality_tiers,
            self.adult_keywords
        )
    }
}

fn keyword_list(list: &str, keywords: &[String]) -> ConfigResult<Vec<String>> {
    keywords
        .iter()
        .map(|keyword| {
            let keyword = keyword.trim().to_lowercase();
            if keyword.is_empty() {
                Err(ConfigurationError::EmptyKeyword {
                    list: list.to_string(),
                })
            } else {
                Ok(keyword)
            }
        })
        .collect()
}

fn override_key(channel: &str, group: Option<&str>) -> String {
    match group.map(normalize_key).filter(|g| !g.is_empty()) {
        Some(group) => format!("{}|{}", normalize_key(channel), group),
        None => normalize_key(channel),
    }
}

impl PatternRegistry {
    /// Validate a pattern configuration and build the lookup tables
    pub fn from_config(config: &PatternsConfig) -> ConfigResult<Self> {
        let catch_all_label = config.catch_all_label.trim().to_string();
        if catch_all_label.is_empty() {
            return Err(ConfigurationError::EmptyCatchAllLabel);
        }

        let mut seen_labels = HashSet::new();
        let mut countries = Vec::with_capacity(config.countries.len());
        for (index, country) in config.countries.iter().enumerate() {
            let label = country.label.trim().to_string();
            if label.is_empty() {
                return Err(ConfigurationError::EmptyCountryLabel { index });
            }
            if !seen_labels.insert(label.clone()) {
                return Err(ConfigurationError::DuplicateCountryLabel { label });
            }
            let keywords = keyword_list(&label, &country.keywords)?;
            countries.push(CountryRule { label, keywords });
        }

        let mut prefix_codes: HashMap<String, String> = HashMap::new();
        for entry in &config.prefix_codes {
            let label = entry.label.trim().to_string();
            if label.is_empty() {
                return Err(ConfigurationError::InvalidPrefixCode {
                    code: entry.codes.join(","),
                    label,
                    message: "label is empty".to_string(),
                });
            }
            for code in &entry.codes {
                let normalized = code.trim().to_lowercase();
                let valid_length = (2..=12).contains(&normalized.len());
                if !valid_length || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigurationError::InvalidPrefixCode {
                        code: code.clone(),
                        label,
                        message: "expected 2-12 ASCII letters".to_string(),
                    });
                }
                if let Some(existing) = prefix_codes.get(&normalized) {
                    if existing != &label {
                        return Err(ConfigurationError::InvalidPrefixCode {
                            code: code.clone(),
                            label,
                            message: format!("already mapped to {existing}"),
                        });
                    }
                }
                prefix_codes.insert(normalized, label.clone());
            }
        }

        let quality_rules = [
            (Quality::Uhd4k, &config.quality.uhd4k),
            (Quality::Fhd, &config.quality.fhd),
            (Quality::Hd, &config.quality.hd),
            (Quality::Sd, &config.quality.sd),
        ]
        .into_iter()
        .map(|(quality, keywords)| {
            keyword_list(&quality.to_string(), keywords)
                .map(|keywords| QualityRule { quality, keywords })
                .map_err(|_| ConfigurationError::InvalidQualityTier {
                    tier: quality.to_string(),
                    message: "contains an empty keyword".to_string(),
                })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

        let adult_keywords = keyword_list("adult_keywords", &config.adult_keywords)?;

        let mut overrides = HashMap::new();
        for (index, rule) in config.overrides.iter().enumerate() {
            let key = override_key(&rule.channel, rule.group.as_deref());
            let country = rule.country.trim().to_string();
            if normalize_key(&rule.channel).is_empty() {
                return Err(ConfigurationError::InvalidOverride {
                    index,
                    message: "channel is empty".to_string(),
                });
            }
            if country.is_empty() {
                return Err(ConfigurationError::InvalidOverride {
                    index,
                    message: "country is empty".to_string(),
                });
            }
            overrides.insert(key, country);
        }

        let registry = Self {
            countries,
            prefix_codes,
            quality_rules,
            adult_keywords,
            overrides,
            catch_all_label,
            prefix_regex: Regex::new(PREFIX_PATTERN)?,
        };
        debug!("Built pattern registry: {}", registry.summary());
        Ok(registry)
    }

    /// Registry built from the compiled-in default patterns
    pub fn with_defaults() -> ConfigResult<Self> {
        Self::from_config(&PatternsConfig::default())
    }

    pub fn catch_all_label(&self) -> &str {
        &self.catch_all_label
    }

    pub fn countries(&self) -> &[CountryRule] {
        &self.countries
    }

    /// Forced label for a channel; the `name|group` key outranks the bare name
    pub fn lookup_override(&self, name: &str, group: &str) -> Option<&str> {
        let name_key = normalize_key(name);
        let group_key = normalize_key(group);

        if !group_key.is_empty() {
            let composite = format!("{name_key}|{group_key}");
            if let Some(label) = self.overrides.get(&composite) {
                return Some(label.as_str());
            }
        }
        self.overrides.get(&name_key).map(String::as_str)
    }

    /// Country for a structural code at the start of `name`, if the code is known
    pub fn lookup_prefix(&self, name: &str) -> Option<(&str, String)> {
        let captures = self.prefix_regex.captures(name)?;
        let code = captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))?
            .as_str()
            .to_lowercase();
        self.prefix_codes
            .get(&code)
            .map(|label| (label.as_str(), code))
    }

    /// First country, in declaration order, with a keyword contained in `name`
    ///
    /// Returns the label and the keyword that matched.
    pub fn match_country_keyword(&self, name: &str) -> Option<(&str, &str)> {
        let haystack = name.to_lowercase();
        self.countries.iter().find_map(|rule| {
            rule.keywords
                .iter()
                .find(|keyword| haystack.contains(keyword.as_str()))
                .map(|keyword| (rule.label.as_str(), keyword.as_str()))
        })
    }

    /// Highest tier whose keyword list matches `text`, 4K first
    pub fn match_quality(&self, text: &str) -> Option<Quality> {
        let haystack = text.to_lowercase();
        self.quality_rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|rule| rule.quality)
    }

    /// First adult keyword contained in `name`
    pub fn match_adult_keyword(&self, name: &str) -> Option<&str> {
        let haystack = name.to_lowercase();
        self.adult_keywords
            .iter()
            .find(|keyword| haystack.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            countries: self.countries.len(),
            keywords: self.countries.iter().map(|c| c.keywords.len()).sum(),
            prefix_codes: self.prefix_codes.len(),
            quality_tiers: self
                .quality_rules
                .iter()
                .filter(|rule| !rule.keywords.is_empty())
                .count(),
            adult_keywords: self.adult_keywords.len(),
            overrides: self.overrides.len(),
        }
    }

    /// Non-fatal configuration smells worth telling the user about
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut first_owner: HashMap<&str, &str> = HashMap::new();

        for rule in &self.countries {
            if rule.keywords.is_empty() {
                warnings.push(format!("Country '{}' has no keywords", rule.label));
            }
            for keyword in &rule.keywords {
                match first_owner.get(keyword.as_str()) {
                    Some(owner) if *owner != rule.label => warnings.push(format!(
                        "Keyword '{}' of '{}' is shadowed by '{}'",
                        keyword, rule.label, owner
                    )),
                    Some(_) => {}
                    None => {
                        first_owner.insert(keyword, &rule.label);
                    }
                }
            }
        }

        let known: HashSet<&str> = self.countries.iter().map(|c| c.label.as_str()).collect();
        let mut prefix_labels: Vec<&str> = self
            .prefix_codes
            .values()
            .map(String::as_str)
            .filter(|label| !known.contains(label))
            .collect();
        prefix_labels.sort_unstable();
        prefix_labels.dedup();
        for label in prefix_labels {
            warnings.push(format!(
                "Prefix label '{}' has no keyword list",
                label
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{CountryPatterns, OverrideRule, PrefixCodes};

    fn config() -> PatternsConfig {
        PatternsConfig {
            catch_all_label: "Other".to_string(),
            adult_keywords: vec!["xxx".to_string()],
            countries: vec![
                CountryPatterns {
                    label: "United Kingdom".to_string(),
                    keywords: vec!["bbc".to_string(), "sky".to_string()],
                },
                CountryPatterns {
                    label: "Germany".to_string(),
                    keywords: vec!["sky".to_string(), "zdf".to_string()],
                },
            ],
            prefix_codes: vec![PrefixCodes {
                label: "United Kingdom".to_string(),
                codes: vec!["uk".to_string(), "GB".to_string()],
            }],
            quality: Default::default(),
            overrides: vec![
                OverrideRule {
                    channel: "ESPN".to_string(),
                    group: None,
                    country: "United States".to_string(),
                },
                OverrideRule {
                    channel: "ESPN".to_string(),
                    group: Some("Sports MX".to_string()),
                    country: "Mexico".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_keyword_match_respects_declaration_order() {
        let registry = PatternRegistry::from_config(&config()).unwrap();
        assert_eq!(
            registry.match_country_keyword("Sky Sports Main Event"),
            Some(("United Kingdom", "sky"))
        );
        assert_eq!(
            registry.match_country_keyword("ZDF Info"),
            Some(("Germany", "zdf"))
        );
        assert_eq!(registry.match_country_keyword("Rai 1"), None);
    }

    #[test]
    fn test_prefix_forms() {
        let registry = PatternRegistry::from_config(&config()).unwrap();
        for name in ["uk: Sky Sports", "UK | BBC", "[GB] Dave", "(uk) Gold", "  Uk:Alibi"] {
            assert_eq!(
                registry.lookup_prefix(name).map(|(label, _)| label),
                Some("United Kingdom"),
                "{name}"
            );
        }
        assert_eq!(registry.lookup_prefix("FR: TF1"), None);
        assert_eq!(registry.lookup_prefix("Sky UK: News"), None);
    }

    #[test]
    fn test_override_lookup_prefers_composite_key() {
        let registry = PatternRegistry::from_config(&config()).unwrap();
        assert_eq!(registry.lookup_override(" espn ", ""), Some("United States"));
        assert_eq!(
            registry.lookup_override("ESPN", "sports   mx"),
            Some("Mexico")
        );
        assert_eq!(
            registry.lookup_override("ESPN", "Sports US"),
            Some("United States")
        );
        assert_eq!(registry.lookup_override("ESPN 2", ""), None);
    }

    #[test]
    fn test_quality_tiers_in_rank_order() {
        let registry = PatternRegistry::with_defaults().unwrap();
        assert_eq!(registry.match_quality("Movies UHD"), Some(Quality::Uhd4k));
        assert_eq!(registry.match_quality("Movies FHD"), Some(Quality::Fhd));
        assert_eq!(registry.match_quality("Movies 720p"), Some(Quality::Hd));
        assert_eq!(registry.match_quality("Movies 480p"), Some(Quality::Sd));
        assert_eq!(registry.match_quality("Movies"), None);
    }

    #[test]
    fn test_invalid_configurations() {
        let mut empty_label = config();
        empty_label.countries[1].label = "  ".to_string();
        assert!(matches!(
            PatternRegistry::from_config(&empty_label),
            Err(ConfigurationError::EmptyCountryLabel { index: 1 })
        ));

        let mut duplicate = config();
        duplicate.countries[1].label = "United Kingdom".to_string();
        assert!(matches!(
            PatternRegistry::from_config(&duplicate),
            Err(ConfigurationError::DuplicateCountryLabel { .. })
        ));

        let mut bad_code = config();
        bad_code.prefix_codes[0].codes.push("u1".to_string());
        assert!(matches!(
            PatternRegistry::from_config(&bad_code),
            Err(ConfigurationError::InvalidPrefixCode { .. })
        ));

        let mut blank_keyword = config();
        blank_keyword.countries[0].keywords.push(" ".to_string());
        assert!(matches!(
            PatternRegistry::from_config(&blank_keyword),
            Err(ConfigurationError::EmptyKeyword { .. })
        ));

        let mut blank_quality = config();
        blank_quality.quality.hd.push(String::new());
        assert!(matches!(
            PatternRegistry::from_config(&blank_quality),
            Err(ConfigurationError::InvalidQualityTier { .. })
        ));

        let mut no_catch_all = config();
        no_catch_all.catch_all_label = String::new();
        assert!(matches!(
            PatternRegistry::from_config(&no_catch_all),
            Err(ConfigurationError::EmptyCatchAllLabel)
        ));

        let mut bad_override = config();
        bad_override.overrides[0].country = String::new();
        assert!(matches!(
            PatternRegistry::from_config(&bad_override),
            Err(ConfigurationError::InvalidOverride { index: 0, .. })
        ));
    }

    #[test]
    fn test_lint_reports_shadowed_keywords() {
        let registry = PatternRegistry::from_config(&config()).unwrap();
        let warnings = registry.lint();
        assert!(warnings
            .iter()
            .any(|w| w.contains("'sky'") && w.contains("shadowed by 'United Kingdom'")));
    }

    #[test]
    fn test_summary_counts() {
        let registry = PatternRegistry::from_config(&config()).unwrap();
        let summary = registry.summary();
        assert_eq!(summary.countries, 2);
        assert_eq!(summary.keywords, 4);
        assert_eq!(summary.prefix_codes, 2);
        assert_eq!(summary.overrides, 2);
        assert_eq!(summary.quality_tiers, 4);
    }
}
