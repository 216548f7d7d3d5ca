//! Streaming helix extraction.
//!
//! Splits a PDB file into one output per `HELIX` descriptor, in a single pass
//! over the atom records:
//!
//! 1. **Open**: every pending region whose initial residue and chain match the
//!    current atom gets a sink. Several regions may open on the same atom.
//! 2. **Route and close**: the atom is routed through every open sink,
//!    including the ones it just opened. A sink whose chain differs from the
//!    atom's, or whose terminal residue lies before the atom, is closed without
//!    receiving it; every other sink receives the atom.
//! 3. At end of input the sinks still open are closed as they are.
//!
//! A region whose initial residue never occurs produces no output. A region
//! is opened at most once and never reopened after closing.
//!
//! # Memory Complexity
//!
//! O(k) where k = maximum number of regions open on one atom. Time is
//! O(atoms * pending regions) in the worst case.

use crate::batch::BatchStats;
use crate::pdb::{self, Result};
use crate::record::{AtomRecord, RecordKey};
use crate::region::{Region, RegionCatalog};
use crate::streaming::buffers::sink_buffer_size;
use crate::streaming::{
    FileSinkFactory, MemorySinkFactory, OpenSinks, RecordSink, Route, SinkFactory, SinkId,
};
use std::path::Path;

/// State of an open region.
struct OpenRegion<S> {
    sink: S,
    end: RecordKey,
    end_chain: char,
}

/// Helix extraction command configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractCommand {
    /// Use small per-sink buffers
    pub low_memory: bool,
}

impl ExtractCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every helix of `input` into its own file in `out_dir`.
    ///
    /// Output files are named `{length}_{stem}_{ordinal}.pdb`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, out_dir: Q) -> Result<ExtractStats> {
        let content = pdb::read_file(input.as_ref())?;
        let base = pdb::base_name(input.as_ref());
        let mut factory =
            FileSinkFactory::with_capacity(out_dir, sink_buffer_size(self.low_memory));
        extract_content(&content, &base, &mut factory)
    }
}

/// Extract the helices of in-memory file content.
pub fn extract_content<F: SinkFactory>(
    content: &[u8],
    base: &str,
    factory: &mut F,
) -> Result<ExtractStats> {
    let catalog = RegionCatalog::build(pdb::helix_lines(content));
    if catalog.is_empty() {
        // Nothing can open; count atoms only
        return Ok(ExtractStats {
            atoms: pdb::atoms(content).count(),
            skipped_descriptors: catalog.skipped(),
            ..ExtractStats::default()
        });
    }
    extract_with(pdb::atoms(content), &catalog, base, factory)
}

/// Extract helices and return `(file name, content)` pairs sorted by name.
///
/// Never fails: a file without usable helices yields an empty vector.
pub fn extract_regions(content: &[u8], base: &str) -> Vec<(String, String)> {
    let mut factory = MemorySinkFactory::new();
    match extract_content(content, base, &mut factory) {
        Ok(_) => factory.into_outputs(),
        Err(_) => Vec::new(),
    }
}

/// Run the multiplexer over an atom stream and a region catalog.
pub fn extract_with<'a, I, F>(
    atoms: I,
    catalog: &RegionCatalog,
    base: &str,
    factory: &mut F,
) -> Result<ExtractStats>
where
    I: IntoIterator<Item = AtomRecord<'a>>,
    F: SinkFactory,
{
    let mut pending: Vec<&Region> = catalog.regions().iter().collect();
    let mut open: OpenSinks<OpenRegion<F::Sink>> = OpenSinks::new();

    let mut stats = ExtractStats {
        regions: catalog.len(),
        skipped_descriptors: catalog.skipped(),
        ..ExtractStats::default()
    };

    for atom in atoms {
        stats.atoms += 1;

        // Open every region starting at this atom
        let mut i = 0;
        while i < pending.len() {
            if pending[i].starts_at(&atom) {
                let region = pending.remove(i);
                let sink = factory.open(SinkId::Region {
                    length: region.length,
                    base,
                    ordinal: region.ordinal,
                })?;
                open.insert(OpenRegion {
                    sink,
                    end: region.end,
                    end_chain: region.end_chain,
                });
            } else {
                i += 1;
            }
        }

        if open.is_empty() {
            continue;
        }

        // Route the atom, collecting regions it has left
        let records_written = &mut stats.records_written;
        let closed = open.route(|region| -> Result<Route> {
            if atom.within(&region.end, region.end_chain) {
                region.sink.write_record(atom.line)?;
                *records_written += 1;
                Ok(Route::Keep)
            } else {
                Ok(Route::Evict)
            }
        })?;
        for region in closed {
            factory.close(region.sink)?;
        }
    }

    stats.max_open = open.max_open();
    stats.sinks_opened = open.total_opened();
    stats.unopened = pending.len();
    for region in open.drain() {
        factory.close(region.sink)?;
    }

    Ok(stats)
}

/// Statistics from a helix extraction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractStats {
    pub atoms: usize,
    pub regions: usize,
    pub skipped_descriptors: usize,
    pub sinks_opened: usize,
    /// Regions whose initial residue never occurred
    pub unopened: usize,
    pub records_written: usize,
    pub max_open: usize,
}

impl BatchStats for ExtractStats {
    fn merge(&mut self, other: &ExtractStats) {
        self.atoms += other.atoms;
        self.regions += other.regions;
        self.skipped_descriptors += other.skipped_descriptors;
        self.sinks_opened += other.sinks_opened;
        self.unopened += other.unopened;
        self.records_written += other.records_written;
        self.max_open = self.max_open.max(other.max_open);
    }
}

impl std::fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Atoms: {}, Helices: {}, Skipped descriptors: {}, Extracted: {}, Never started: {}, Records written: {}, Max open: {}",
            self.atoms,
            self.regions,
            self.skipped_descriptors,
            self.sinks_opened,
            self.unopened,
            self.records_written,
            self.max_open
        )
    }
}
