//! Command implementations for helixcut.

pub mod dedup;
pub mod extract;
pub mod slice;

pub use dedup::{sequence_checksum, DedupCommand, DedupStats, Selection};
pub use extract::{extract_content, extract_regions, extract_with, ExtractCommand, ExtractStats};
pub use slice::{count_positions, slice_content, slice_windows, slice_with, SliceCommand, SliceStats};
