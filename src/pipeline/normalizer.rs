//! Field cleanup and mandatory-field validation

use tracing::debug;

use crate::errors::ValidationError;
use crate::models::{NormalizedEntry, RawEntry, RejectedEntry, Signature};
use crate::patterns::PatternRegistry;
use crate::utils::text::{clean_field, strip_control_chars};
use crate::utils::url::parse_stream_url;

/// Validation knobs applied on top of the mandatory-field checks
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub min_channel_name_length: usize,
    pub skip_adult_content: bool,
    /// Accepted URL schemes; empty accepts any scheme with a host
    pub allowed_schemes: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_channel_name_length: 1,
            skip_adult_content: false,
            allowed_schemes: Vec::new(),
        }
    }
}

impl From<&crate::config::ProcessingConfig> for NormalizerConfig {
    fn from(config: &crate::config::ProcessingConfig) -> Self {
        Self {
            min_channel_name_length: config.min_channel_name_length,
            skip_adult_content: config.skip_adult_content,
            allowed_schemes: config.allowed_schemes.clone(),
        }
    }
}

pub struct Normalizer<'a> {
    config: NormalizerConfig,
    registry: &'a PatternRegistry,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: NormalizerConfig, registry: &'a PatternRegistry) -> Self {
        Self { config, registry }
    }

    /// Clean a raw entry, or reject it with the reason
    pub fn normalize(&self, raw: RawEntry) -> Result<NormalizedEntry, RejectedEntry> {
        match self.try_normalize(&raw) {
            Ok(entry) => Ok(entry),
            Err(reason) => {
                debug!("Rejected entry '{}': {}", raw.name.trim(), reason);
                Err(RejectedEntry { raw, reason })
            }
        }
    }

    /// Normalize a batch, splitting survivors from rejections in input order
    pub fn normalize_all(
        &self,
        raw_entries: Vec<RawEntry>,
    ) -> (Vec<NormalizedEntry>, Vec<RejectedEntry>) {
        let mut normalized = Vec::with_capacity(raw_entries.len());
        let mut rejected = Vec::new();

        for raw in raw_entries {
            match self.normalize(raw) {
                Ok(entry) => normalized.push(entry),
                Err(rejection) => rejected.push(rejection),
            }
        }

        (normalized, rejected)
    }

    fn try_normalize(&self, raw: &RawEntry) -> Result<NormalizedEntry, ValidationError> {
        let name = clean_field(&raw.name);
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let length = name.chars().count();
        if length < self.config.min_channel_name_length {
            return Err(ValidationError::NameTooShort {
                length,
                min: self.config.min_channel_name_length,
            });
        }

        let stream_url = strip_control_chars(&raw.stream_url).trim().to_string();
        if stream_url.is_empty() {
            return Err(ValidationError::MissingStreamUrl);
        }

        let parsed = parse_stream_url(&stream_url, &self.config.allowed_schemes).map_err(
            |message| ValidationError::InvalidStreamUrl {
                url: stream_url.clone(),
                message,
            },
        )?;

        if self.config.skip_adult_content {
            if let Some(keyword) = self.registry.match_adult_keyword(&name) {
                return Err(ValidationError::AdultContent {
                    keyword: keyword.to_string(),
                });
            }
        }

        let stream_url = parsed.to_string();
        let signature = Signature::compute(&name, &stream_url);

        Ok(NormalizedEntry {
            group: clean_field(&raw.group),
            logo_url: strip_control_chars(&raw.logo_url).trim().to_string(),
            epg_id: strip_control_chars(&raw.epg_id).trim().to_string(),
            origin: raw.origin,
            name,
            stream_url,
            signature,
        })
    }
}
