//! PDB file access: reading, record extraction and error types.
//!
//! Only the records this crate consumes are interpreted: `ATOM`/`HETATM`
//! coordinate lines and `HELIX` descriptors. Everything else is passed over.

use crate::record::AtomRecord;
use crate::streaming::parsing::{classify_line, lines, RecordKind};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while processing PDB files.
#[derive(Error, Debug)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PdbError>;

/// Read a whole PDB file into memory.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// File name without its extension, used to name output files.
pub fn base_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lazily iterate over the atom records of a file, in file order.
///
/// Atom lines whose sequence number cannot be read are skipped.
pub fn atoms(content: &[u8]) -> impl Iterator<Item = AtomRecord<'_>> {
    lines(content)
        .enumerate()
        .filter(|(_, line)| classify_line(line) == RecordKind::Atom)
        .filter_map(|(idx, line)| {
            let atom = AtomRecord::parse(line);
            if atom.is_none() {
                tracing::debug!(line = idx + 1, "skipping atom record without sequence number");
            }
            atom
        })
}

/// Lazily iterate over the `HELIX` descriptor lines of a file.
pub fn helix_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    lines(content).filter(|line| classify_line(line) == RecordKind::Helix)
}
