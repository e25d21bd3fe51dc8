//! Centralized error handling for the M3U Curator
//!
//! # Error Categories
//!
//! - **Validation Errors**: a single raw entry is unusable; it is dropped,
//!   recorded and counted, and the run carries on
//! - **Configuration Errors**: the pattern registry or config could not be
//!   built; the run is aborted before any entry is processed
//! - **I/O and Serialization Errors**: reading inputs or writing outputs failed
//!
//! Deduplication and aggregation have no error type: they only ever see
//! entries that already passed validation.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for registry and configuration Results
pub type ConfigResult<T> = Result<T, ConfigurationError>;
