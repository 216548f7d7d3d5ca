//! Helix regions and the per-file region catalog.
//!
//! Each `HELIX` descriptor declares a span of residues from an initial to a
//! terminal residue. The catalog turns the descriptors of one file into typed
//! [`Region`]s, dropping descriptors that lack the fields we need.

use std::fmt;

use crate::record::{AtomRecord, RecordKey};
use crate::streaming::parsing::{
    column_char, field, parse_i32_field, HELIX_END_CHAIN, HELIX_END_ICODE, HELIX_END_SEQ,
    HELIX_LENGTH, HELIX_START_CHAIN, HELIX_START_ICODE, HELIX_START_SEQ,
};

/// A helix declared by one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// First residue, inclusive
    pub start: RecordKey,
    /// Last residue, inclusive
    pub end: RecordKey,
    /// Chain of the first residue
    pub chain: char,
    /// Chain of the last residue; atoms on any other chain close the region
    pub end_chain: char,
    /// Declared number of residues
    pub length: u32,
    /// 1-based position among the kept descriptors of the file
    pub ordinal: usize,
}

impl Region {
    /// True if this atom is the first atom of the region.
    #[inline]
    pub fn starts_at(&self, atom: &AtomRecord<'_>) -> bool {
        atom.key == self.start && atom.chain_id == self.chain
    }

    /// True if the atom still belongs to the region once it has started.
    #[inline]
    pub fn contains(&self, atom: &AtomRecord<'_>) -> bool {
        atom.within(&self.end, self.end_chain)
    }
}

/// Why a descriptor was left out of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingLength,
    MissingStart,
    MissingEnd,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingLength => write!(f, "missing helix length"),
            SkipReason::MissingStart => write!(f, "missing initial residue"),
            SkipReason::MissingEnd => write!(f, "missing terminal residue"),
        }
    }
}

/// Parse the bounds of one descriptor. The ordinal is assigned by the catalog.
fn parse_descriptor(line: &[u8]) -> Result<Region, SkipReason> {
    // Length first: a blank length is the common data-quality gap
    let length = field(line, HELIX_LENGTH)
        .and_then(parse_i32_field)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(SkipReason::MissingLength)?;
    let start_seq = field(line, HELIX_START_SEQ)
        .and_then(parse_i32_field)
        .ok_or(SkipReason::MissingStart)?;
    let end_seq = field(line, HELIX_END_SEQ)
        .and_then(parse_i32_field)
        .ok_or(SkipReason::MissingEnd)?;

    Ok(Region {
        start: RecordKey::new(start_seq, column_char(line, HELIX_START_ICODE)),
        end: RecordKey::new(end_seq, column_char(line, HELIX_END_ICODE)),
        chain: column_char(line, HELIX_START_CHAIN),
        end_chain: column_char(line, HELIX_END_CHAIN),
        length,
        ordinal: 0,
    })
}

/// The regions of one file, in descriptor order.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    skipped: usize,
}

impl RegionCatalog {
    /// Build the catalog from raw `HELIX` lines.
    ///
    /// Descriptors missing a length or a parsable residue range are dropped
    /// and counted; this is expected for a small share of deposited files
    /// and is not an error.
    pub fn build<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut catalog = Self::default();
        for line in descriptors {
            match parse_descriptor(line) {
                Ok(mut region) => {
                    region.ordinal = catalog.regions.len() + 1;
                    catalog.regions.push(region);
                }
                Err(reason) => {
                    tracing::debug!(
                        descriptor = %String::from_utf8_lossy(line).trim_end(),
                        %reason,
                        "skipping helix descriptor"
                    );
                    catalog.skipped += 1;
                }
            }
        }
        catalog
    }

    /// Kept regions.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of descriptors that were dropped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
