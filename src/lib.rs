// Instrument Timeline - Core Library
// Parses legal-instrument delivery documents, merges every state's
// deliveries into one snapshot, and sequences snapshots for playback

pub mod model;
pub mod natural;
pub mod parser;
pub mod merge;
pub mod snapshot;
pub mod playback;
pub mod manifest;

// Re-export commonly used types
pub use model::{build_display_name, Instrument, InstrumentType, Version, VersionKey};
pub use parser::{parse_document, DocumentMeta, DocumentRecord, MalformedXmlError};
pub use merge::{merge_versions, InstrumentMerger};
pub use snapshot::{
    build_scenario, build_snapshot, DocumentSource, PublicationSummary, ScenarioError, Snapshot,
    SnapshotMeta, StateGroup,
};
pub use playback::{PlaybackMode, PlaybackSequencer, ANIMATION_INTERVAL};
pub use manifest::{
    build_index, load_index, load_state_groups, write_index, ScenarioEntry, ScenarioIndex,
    StateEntry, INDEX_FILE,
};
pub use natural::natural_cmp;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
