//! Utility functions for the M3U Curator
//!
//! - `utils::text` for whitespace/control-character cleanup and comparison keys
//! - `utils::url` for stream URL validation and canonicalization

pub mod text;
pub mod url;
