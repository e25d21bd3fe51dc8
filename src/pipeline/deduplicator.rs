//! Signature-based duplicate merging

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{ChannelEntry, Signature};

/// Survivors in first-seen signature order, plus how many entries were merged
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub survivors: Vec<ChannelEntry>,
    pub merged_count: usize,
}

/// Total order used to pick the representative of a signature
///
/// Higher quality first, then more non-empty optional metadata. `Equal` means
/// a full tie, which keeps the entry seen first.
fn preference(candidate: &ChannelEntry, current: &ChannelEntry) -> Ordering {
    candidate
        .quality
        .cmp(&current.quality)
        .then_with(|| candidate.metadata_richness().cmp(&current.metadata_richness()))
}

/// Collapse entries sharing a signature
///
/// Running it again on its own survivors merges nothing.
pub fn deduplicate(entries: Vec<ChannelEntry>) -> DedupOutcome {
    let mut slots: Vec<ChannelEntry> = Vec::with_capacity(entries.len());
    let mut index_by_signature: HashMap<Signature, usize> = HashMap::with_capacity(entries.len());
    let mut merged_count = 0;

    for entry in entries {
        let existing = index_by_signature.get(&entry.signature).copied();
        match existing {
            None => {
                index_by_signature.insert(entry.signature.clone(), slots.len());
                slots.push(entry);
            }
            Some(slot) => {
                merged_count += 1;
                let current = &mut slots[slot];
                if preference(&entry, current) == Ordering::Greater {
                    debug!(
                        "Duplicate '{}' replaces earlier entry ({} over {})",
                        entry.name, entry.quality, current.quality
                    );
                    *current = entry;
                } else {
                    debug!("Duplicate '{}' merged into earlier entry", entry.name);
                }
            }
        }
    }

    DedupOutcome {
        survivors: slots,
        merged_count,
    }
}
