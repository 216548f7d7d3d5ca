// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]

//! helixcut: helix extraction, slicing and deduplication for PDB files
//!
//! This library splits protein structure files into their helices in a
//! single streaming pass over the atom records.
//!
//! # Features
//!
//! - **Helix extraction**: one output per `HELIX` descriptor, with exact
//!   residue bounds, chain handling and insertion-code ordering
//! - **Sliding windows**: every run of `n` consecutive residues of a helix
//! - **Deduplication**: one structure per alpha-carbon sequence
//! - **Parallel batches**: directories are processed file-by-file with Rayon
//!
//! # Example
//!
//! ```rust,no_run
//! use helixcut::commands::{extract_regions, slice_windows};
//!
//! let content = std::fs::read("1abc.pdb").unwrap();
//!
//! // (file name, content) per helix
//! for (name, helix) in extract_regions(&content, "1abc") {
//!     // 9-residue windows of each helix
//!     let windows = slice_windows(helix.as_bytes(), name.trim_end_matches(".pdb"), 9);
//!     println!("{}: {} windows", name, windows.len());
//! }
//! ```

pub mod batch;
pub mod commands;
pub mod config;
pub mod pdb;
pub mod record;
pub mod region;
pub mod streaming;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use pdb::{PdbError, Result};
pub use record::{AtomRecord, RecordKey};
pub use region::{Region, RegionCatalog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        extract_regions, slice_windows, DedupCommand, ExtractCommand, SliceCommand,
    };
    pub use crate::record::{AtomRecord, RecordKey};
    pub use crate::region::{Region, RegionCatalog};
    pub use crate::streaming::{FileSinkFactory, MemorySinkFactory, SinkFactory};
}
