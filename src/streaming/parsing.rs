//! Zero-allocation fixed-column PDB parsing utilities.
//!
//! PDB records are fixed-width: every field lives at a known column range.
//! Column numbers in the format documentation are 1-based and inclusive;
//! the constants here are the equivalent 0-based half-open byte ranges.

use memchr::memchr_iter;
use std::ops::Range;

/// Atom name, columns 13-16.
pub const ATOM_NAME: Range<usize> = 12..16;
/// Alternate location indicator, column 17.
pub const ALT_LOC: usize = 16;
/// Residue name, columns 18-20.
pub const RESIDUE_NAME: Range<usize> = 17..20;
/// Chain identifier, column 22.
pub const ATOM_CHAIN: usize = 21;
/// Residue sequence number, columns 23-26.
pub const ATOM_SEQ: Range<usize> = 22..26;
/// Insertion code, column 27.
pub const ATOM_ICODE: usize = 26;

/// HELIX: chain of the initial residue, column 20.
pub const HELIX_START_CHAIN: usize = 19;
/// HELIX: sequence number of the initial residue, columns 22-25.
pub const HELIX_START_SEQ: Range<usize> = 21..25;
/// HELIX: insertion code of the initial residue, column 26.
pub const HELIX_START_ICODE: usize = 25;
/// HELIX: chain of the terminal residue, column 32.
pub const HELIX_END_CHAIN: usize = 31;
/// HELIX: sequence number of the terminal residue, columns 34-37.
pub const HELIX_END_SEQ: Range<usize> = 33..37;
/// HELIX: insertion code of the terminal residue, column 38.
pub const HELIX_END_ICODE: usize = 37;
/// HELIX: declared helix length, columns 72-76.
pub const HELIX_LENGTH: Range<usize> = 71..76;

/// Kind of a PDB record, by its record name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `ATOM` or `HETATM` coordinate record
    Atom,
    /// `HELIX` secondary-structure descriptor
    Helix,
    Other,
}

/// Classify a line by its record name.
#[inline(always)]
pub fn classify_line(line: &[u8]) -> RecordKind {
    if line.starts_with(b"ATOM") || line.starts_with(b"HETATM") {
        RecordKind::Atom
    } else if line.starts_with(b"HELIX") {
        RecordKind::Helix
    } else {
        RecordKind::Other
    }
}

/// Split content into lines using memchr, without the trailing `\n` / `\r\n`.
///
/// A final line without a terminating newline is still yielded; an empty
/// trailing segment is not.
pub fn lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut start = 0;
    let ends = memchr_iter(b'\n', content).chain(std::iter::once(content.len()));
    ends.filter_map(move |end| {
        if start > content.len() || (end == content.len() && start == end) {
            start = content.len() + 1;
            return None;
        }
        let mut line = &content[start..end];
        start = end + 1;
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        Some(line)
    })
}

/// Get a fixed-column field, or None if the line is too short.
#[inline(always)]
pub fn field(line: &[u8], range: Range<usize>) -> Option<&[u8]> {
    line.get(range)
}

/// Get a single-column character. Columns past the end of the line read as
/// blank, the way trailing spaces are commonly trimmed from PDB files.
#[inline(always)]
pub fn column_char(line: &[u8], index: usize) -> char {
    line.get(index).map_or(' ', |&b| char::from(b))
}

/// Trim ASCII spaces from both ends of a field.
#[inline(always)]
pub fn trim_field(bytes: &[u8]) -> &[u8] {
    bytes.trim_ascii()
}

/// Fast signed integer parsing for right-justified numeric columns.
///
/// Surrounding spaces are ignored. Returns None for blank fields, stray
/// characters, or values out of `i32` range.
#[inline(always)]
pub fn parse_i32_field(bytes: &[u8]) -> Option<i32> {
    let bytes = trim_field(bytes);
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        Some(_) => (false, bytes),
        None => return None,
    };
    if digits.is_empty() {
        return None;
    }
    let mut n: i64 = 0;
    for &b in digits {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n * 10 + d as i64;
        if n > i32::MAX as i64 + 1 {
            return None;
        }
    }
    let n = if negative { -n } else { n };
    i32::try_from(n).ok()
}
