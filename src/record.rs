//! Residue keys and atom records.
//!
//! A residue position within a chain is identified by its sequence number and
//! insertion code. [`RecordKey`] orders positions the way residues follow one
//! another in a PDB file: by sequence number, then by insertion code, where a
//! blank insertion code sorts before any letter (`52 < 52A < 52B < 53`).

use std::cmp::Ordering;
use std::fmt;

use crate::streaming::parsing::{column_char, field, parse_i32_field, ATOM_CHAIN, ATOM_ICODE, ATOM_SEQ};

/// A residue position: `(sequence number, insertion code)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub sequence_number: i32,
    pub insertion_code: char,
}

impl RecordKey {
    /// Create a new key.
    #[inline]
    pub fn new(sequence_number: i32, insertion_code: char) -> Self {
        Self {
            sequence_number,
            insertion_code,
        }
    }

    /// Key with a blank insertion code.
    #[inline]
    pub fn seq(sequence_number: i32) -> Self {
        Self::new(sequence_number, ' ')
    }

    /// True if this position lies strictly after `end`.
    ///
    /// `end` is inclusive, including its insertion code.
    #[inline]
    pub fn is_past(&self, end: &RecordKey) -> bool {
        self > end
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence_number
            .cmp(&other.sequence_number)
            .then(self.insertion_code.cmp(&other.insertion_code))
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sequence_number)?;
        if self.insertion_code != ' ' {
            write!(f, "{}", self.insertion_code)?;
        }
        Ok(())
    }
}

/// An `ATOM`/`HETATM` record borrowed from the file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomRecord<'a> {
    /// Raw line, without line terminator
    pub line: &'a [u8],
    pub key: RecordKey,
    pub chain_id: char,
}

impl<'a> AtomRecord<'a> {
    /// Parse the position fields of an atom line.
    ///
    /// Returns None if the sequence number columns are missing or not numeric.
    #[inline]
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let sequence_number = parse_i32_field(field(line, ATOM_SEQ)?)?;
        Some(Self {
            line,
            key: RecordKey::new(sequence_number, column_char(line, ATOM_ICODE)),
            chain_id: column_char(line, ATOM_CHAIN),
        })
    }

    /// True if the atom sits on `chain` at a position no later than `end`.
    #[inline]
    pub fn within(&self, end: &RecordKey, chain: char) -> bool {
        self.chain_id == chain && !self.key.is_past(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let mut keys = [
            RecordKey::seq(53),
            RecordKey::new(52, 'B'),
            RecordKey::seq(52),
            RecordKey::new(52, 'A'),
            RecordKey::seq(-1),
        ];
        keys.sort();

        assert_eq!(keys[0], RecordKey::seq(-1));
        assert_eq!(keys[1], RecordKey::seq(52));
        assert_eq!(keys[2], RecordKey::new(52, 'A'));
        assert_eq!(keys[3], RecordKey::new(52, 'B'));
        assert_eq!(keys[4], RecordKey::seq(53));
    }

    #[test]
    fn test_is_past_inclusive_end() {
        let end = RecordKey::new(10, 'A');

        assert!(!RecordKey::seq(10).is_past(&end));
        assert!(!RecordKey::new(10, 'A').is_past(&end));
        assert!(RecordKey::new(10, 'B').is_past(&end));
        assert!(RecordKey::seq(11).is_past(&end));
        assert!(!RecordKey::seq(9).is_past(&end));
    }

    #[test]
    fn test_parse_atom() {
        let line = b"ATOM      2  CA  MET A  12A     11.104   6.134  -6.504  1.00  0.00           C";
        let atom = AtomRecord::parse(line).unwrap();

        assert_eq!(atom.key, RecordKey::new(12, 'A'));
        assert_eq!(atom.chain_id, 'A');
        assert_eq!(atom.line, &line[..]);
    }

    #[test]
    fn test_parse_atom_short_or_malformed() {
        assert!(AtomRecord::parse(b"ATOM      2  CA  MET A").is_none());
        assert!(AtomRecord::parse(b"ATOM      2  CA  MET A  XX      ").is_none());

        // Insertion code column missing reads as blank
        let atom = AtomRecord::parse(b"ATOM      2  CA  MET B   7").unwrap();
        assert_eq!(atom.key, RecordKey::seq(7));
        assert_eq!(atom.chain_id, 'B');
    }

    #[test]
    fn test_within_chain_partition() {
        let atom = AtomRecord::parse(b"ATOM      2  CA  MET B   7      ").unwrap();

        assert!(atom.within(&RecordKey::seq(7), 'B'));
        assert!(!atom.within(&RecordKey::seq(7), 'A'));
        assert!(!atom.within(&RecordKey::seq(6), 'B'));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(RecordKey::seq(5).to_string(), "5");
        assert_eq!(RecordKey::new(5, 'A').to_string(), "5A");
    }
}
