//! Service layer
//!
//! [`CurationService`] ties sources, the pipeline, generators and storage
//! together into one run.

pub mod curation;

pub use curation::{CurationService, LoadedInputs, RunSummary};
