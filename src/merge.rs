// Merging within one state - combine version records from every delivery
// document of that state into one history per instrument
// Later documents supersede earlier reads of the same legal version

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::model::{Instrument, Version, VersionKey};

// ============================================================================
// VERSION MERGER
// ============================================================================

/// Merge two version lists keyed by merge identity.
///
/// When both lists carry a version with the same key, the incoming one wins:
/// a later document's record of the same legal version supersedes an earlier
/// read of it. The result is re-sorted into timeline order. Pure and
/// idempotent - merging a list with itself returns the same list.
pub fn merge_versions(existing: &[Version], incoming: &[Version]) -> Vec<Version> {
    let mut by_key: HashMap<VersionKey, Version> =
        HashMap::with_capacity(existing.len() + incoming.len());
    // Chain order makes the incoming record win on key collisions
    for version in existing.iter().chain(incoming.iter()) {
        by_key.insert(version.key(), version.clone());
    }

    let mut merged: Vec<Version> = by_key.into_values().collect();
    merged.sort_by(Version::timeline_order);
    merged
}

// ============================================================================
// INSTRUMENT MERGER
// ============================================================================

/// Running per-state collection of instruments, fed one document at a time.
///
/// Feeding order matters: version records and type upgrades from later
/// documents take precedence, so documents must be folded in their state's
/// filename order.
pub struct InstrumentMerger {
    by_id: HashMap<String, Instrument>,
}

impl InstrumentMerger {
    pub fn new() -> Self {
        InstrumentMerger {
            by_id: HashMap::new(),
        }
    }

    /// Fold one document's instruments into the running collection.
    pub fn fold_document(&mut self, instruments: Vec<Instrument>) {
        for incoming in instruments {
            match self.by_id.entry(incoming.instrument_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(incoming);
                }
                Entry::Occupied(mut slot) => {
                    let current = slot.get_mut();
                    current.versions = merge_versions(&current.versions, &incoming.versions);
                    // A more specific typing wins, and only strictly: an
                    // equally-weighted record never flips the type
                    if incoming.instrument_type.weight() < current.instrument_type.weight() {
                        current.instrument_type = incoming.instrument_type;
                    }
                    current.relabel();
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Consume the merger and return the state's instruments in document
    /// order (type weight, then display name).
    pub fn finish(self) -> Vec<Instrument> {
        let mut instruments: Vec<Instrument> = self.by_id.into_values().collect();
        instruments.sort_by(Instrument::document_order);
        instruments
    }
}

impl Default for InstrumentMerger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
