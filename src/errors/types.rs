//! Error type definitions for the M3U Curator
//!
//! This module defines all error types used throughout the crate. Per-entry
//! validation failures are values that get collected and reported, while
//! configuration failures abort a run before any entry is processed.

use thiserror::Error;

/// Top-level application error type
///
/// Everything that can stop a run ends up here. Validation failures of single
/// entries never do; they are carried as [`ValidationError`] inside rejection
/// records instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// Pattern registry or application configuration could not be built
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Filesystem errors while reading inputs or writing outputs
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Report or stats serialization failures
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Reasons a raw entry is rejected by the normalizer
///
/// The entry is dropped from the run, recorded for reporting and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationError {
    /// Channel name is empty after whitespace cleanup
    #[error("Missing channel name")]
    MissingName,

    /// Channel name is shorter than the configured minimum
    #[error("Channel name too short: {length} characters (min: {min})")]
    NameTooShort { length: usize, min: usize },

    /// Stream URL is empty after cleanup
    #[error("Missing stream URL")]
    MissingStreamUrl,

    /// Stream URL is not a well-formed network address
    #[error("Invalid stream URL '{url}': {message}")]
    InvalidStreamUrl { url: String, message: String },

    /// Channel name matched an adult content keyword
    #[error("Adult content filtered (keyword: {keyword})")]
    AdultContent { keyword: String },
}

impl ValidationError {
    /// Stable short key for grouping rejections in stats and reports
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingName => "missing_name",
            ValidationError::NameTooShort { .. } => "name_too_short",
            ValidationError::MissingStreamUrl => "missing_stream_url",
            ValidationError::InvalidStreamUrl { .. } => "invalid_stream_url",
            ValidationError::AdultContent { .. } => "adult_content",
        }
    }
}

/// Pattern registry and configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A country rule with a blank label
    #[error("Country rule #{index} has an empty label")]
    EmptyCountryLabel { index: usize },

    /// The same country label is declared twice in the keyword table
    #[error("Duplicate country label: {label}")]
    DuplicateCountryLabel { label: String },

    /// A blank keyword would match every channel name
    #[error("Empty keyword in pattern list for {list}")]
    EmptyKeyword { list: String },

    /// Catch-all label must be a non-empty string
    #[error("Catch-all label must not be empty")]
    EmptyCatchAllLabel,

    /// Prefix codes are short alphabetic tokens such as "uk" or "usa"
    #[error("Invalid prefix code '{code}' for {label}: {message}")]
    InvalidPrefixCode {
        code: String,
        label: String,
        message: String,
    },

    /// Override entries need both a channel key and a forced label
    #[error("Invalid override #{index}: {message}")]
    InvalidOverride { index: usize, message: String },

    /// Quality tier table could not be built
    #[error("Invalid quality tier '{tier}': {message}")]
    InvalidQualityTier { tier: String, message: String },

    /// Regex compilation failures
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration file could not be read
    #[error("Failed to read {path}: {message}")]
    Unreadable { path: String, message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Wrap an I/O error with the path it happened on
    pub fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ConfigurationError {
    /// Create a parse error for a configuration file
    pub fn parse<P: AsRef<std::path::Path>, S: ToString>(path: P, message: S) -> Self {
        Self::Parse {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a read error for a configuration file
    pub fn unreadable<P: AsRef<std::path::Path>, S: ToString>(path: P, message: S) -> Self {
        Self::Unreadable {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }
}
