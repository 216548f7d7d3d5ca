//! Sliding-window slicing of helices.
//!
//! Cuts a PDB file (typically one extracted helix) into every run of `n`
//! consecutive residue positions. A file with `k` distinct positions yields
//! `k - n + 1` windows; window `i` holds the atoms of positions `i..i + n`.
//!
//! Two passes over the atom records: the first counts distinct positions, the
//! second opens a window at each new position and routes every atom through
//! the open windows. A window counts the positions it has seen, starting
//! with the one it opened on, and closes on the `n + 1`-th.
//!
//! Positions are counted on `(sequence number, insertion code)` changes only,
//! unless chain-aware windows are enabled in [`crate::config`].

use crate::batch::BatchStats;
use crate::config::{is_chain_aware_windows, position_of};
use crate::pdb::{self, PdbError, Result};
use crate::record::{AtomRecord, RecordKey};
use crate::streaming::buffers::sink_buffer_size;
use crate::streaming::{
    FileSinkFactory, MemorySinkFactory, OpenSinks, RecordSink, Route, SinkFactory, SinkId,
};
use std::path::Path;

/// State of an open window.
struct OpenWindow<S> {
    sink: S,
    /// Distinct positions seen since the window opened
    spanned: usize,
}

/// Sliding-window command configuration.
#[derive(Debug, Clone)]
pub struct SliceCommand {
    /// Number of residue positions per window
    pub window: usize,
    /// Use small per-sink buffers
    pub low_memory: bool,
}

impl Default for SliceCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceCommand {
    pub fn new() -> Self {
        Self {
            window: 10,
            low_memory: false,
        }
    }

    /// Slice `input` into windows written to `out_dir` as `{stem}_{ordinal}.pdb`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, out_dir: Q) -> Result<SliceStats> {
        if self.window == 0 {
            return Err(PdbError::InvalidInput(
                "window size must be at least 1".to_string(),
            ));
        }
        let content = pdb::read_file(input.as_ref())?;
        let base = pdb::base_name(input.as_ref());
        let mut factory =
            FileSinkFactory::with_capacity(out_dir, sink_buffer_size(self.low_memory));
        slice_content(&content, &base, self.window, &mut factory)
    }
}

/// Count distinct positions: the number of times the position changes from
/// one atom to the next, counting the first atom.
pub fn count_positions<'a, I>(atoms: I, chain_aware: bool) -> usize
where
    I: IntoIterator<Item = AtomRecord<'a>>,
{
    let mut previous: Option<(RecordKey, char)> = None;
    let mut count = 0;
    for atom in atoms {
        let position = Some(position_of(&atom, chain_aware));
        if position != previous {
            count += 1;
            previous = position;
        }
    }
    count
}

/// Slice in-memory file content.
pub fn slice_content<F: SinkFactory>(
    content: &[u8],
    base: &str,
    window: usize,
    factory: &mut F,
) -> Result<SliceStats> {
    let chain_aware = is_chain_aware_windows();
    let total = count_positions(pdb::atoms(content), chain_aware);
    slice_with(pdb::atoms(content), total, window, chain_aware, base, factory)
}

/// Slice into windows and return `(file name, content)` pairs sorted by name.
///
/// Never fails: too few positions, or a zero window, yields an empty vector.
pub fn slice_windows(content: &[u8], base: &str, window: usize) -> Vec<(String, String)> {
    let mut factory = MemorySinkFactory::new();
    match slice_content(content, base, window, &mut factory) {
        Ok(_) => factory.into_outputs(),
        Err(_) => Vec::new(),
    }
}

/// Run the sliding window over an atom stream with `total` distinct positions.
pub fn slice_with<'a, I, F>(
    atoms: I,
    total: usize,
    window: usize,
    chain_aware: bool,
    base: &str,
    factory: &mut F,
) -> Result<SliceStats>
where
    I: IntoIterator<Item = AtomRecord<'a>>,
    F: SinkFactory,
{
    let mut stats = SliceStats {
        positions: total,
        ..SliceStats::default()
    };
    if window == 0 || total < window {
        return Ok(stats);
    }

    // Windows open at positions 1..=total - window + 1
    let open_limit = total - window + 2;
    let mut open: OpenSinks<OpenWindow<F::Sink>> = OpenSinks::new();
    let mut previous: Option<(RecordKey, char)> = None;
    let mut position_index = 0;

    for atom in atoms {
        stats.atoms += 1;

        let position = Some(position_of(&atom, chain_aware));
        let new_position = position != previous;
        if new_position {
            position_index += 1;
            previous = position;
            if position_index < open_limit {
                let sink = factory.open(SinkId::Window {
                    base,
                    ordinal: position_index,
                })?;
                open.insert(OpenWindow { sink, spanned: 0 });
            }
        }

        if open.is_empty() {
            continue;
        }

        let records_written = &mut stats.records_written;
        let closed = open.route(|w| -> Result<Route> {
            if new_position {
                w.spanned += 1;
            }
            if w.spanned > window {
                Ok(Route::Evict)
            } else {
                w.sink.write_record(atom.line)?;
                *records_written += 1;
                Ok(Route::Keep)
            }
        })?;
        for w in closed {
            factory.close(w.sink)?;
        }
    }

    stats.windows = open.total_opened();
    stats.max_open = open.max_open();
    for w in open.drain() {
        factory.close(w.sink)?;
    }

    Ok(stats)
}

/// Statistics from a sliding-window run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SliceStats {
    pub atoms: usize,
    pub positions: usize,
    pub windows: usize,
    pub records_written: usize,
    pub max_open: usize,
}

impl BatchStats for SliceStats {
    fn merge(&mut self, other: &SliceStats) {
        self.atoms += other.atoms;
        self.positions += other.positions;
        self.windows += other.windows;
        self.records_written += other.records_written;
        self.max_open = self.max_open.max(other.max_open);
    }
}

impl std::fmt::Display for SliceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Atoms: {}, Positions: {}, Windows: {}, Records written: {}, Max open: {}",
            self.atoms, self.positions, self.windows, self.records_written, self.max_open
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::set_chain_aware_windows;
    use crate::fixtures::{atom_line, pdb_file};
    use serial_test::serial;

    /// Residue sequence numbers in an output, one entry per atom.
    fn seqs(content: &str) -> Vec<i32> {
        content
            .lines()
            .map(|l| AtomRecord::parse(l.as_bytes()).unwrap().key.sequence_number)
            .collect()
    }

    /// `atoms_per_residue` atoms for each residue in `seqs`, chain A.
    fn residues(seqs: std::ops::RangeInclusive<i32>, atoms_per_residue: u32) -> String {
        let mut lines = Vec::new();
        let mut serial = 1;
        for s in seqs {
            for name in [" N  ", " CA ", " C  ", " O  "].iter().take(atoms_per_residue as usize) {
                lines.push(atom_line(serial, name, 'A', s, ' '));
                serial += 1;
            }
        }
        pdb_file(&lines)
    }

    #[test]
    #[serial]
    fn test_three_over_five() {
        set_chain_aware_windows(false);
        let content = residues(1..=5, 1);
        let outputs = slice_windows(content.as_bytes(), "h", 3);

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].0, "h_1.pdb");
        assert_eq!(seqs(&outputs[0].1), vec![1, 2, 3]);
        assert_eq!(outputs[1].0, "h_2.pdb");
        assert_eq!(seqs(&outputs[1].1), vec![2, 3, 4]);
        assert_eq!(outputs[2].0, "h_3.pdb");
        assert_eq!(seqs(&outputs[2].1), vec![3, 4, 5]);
    }

    #[test]
    #[serial]
    fn test_window_count_property() {
        set_chain_aware_windows(false);
        for k in 1..=8 {
            let content = residues(10..=(9 + k), 3);
            for n in 1..=k {
                let outputs = slice_windows(content.as_bytes(), "h", n as usize);
                assert_eq!(outputs.len(), (k - n + 1) as usize, "k={} n={}", k, n);

                for (i, (name, body)) in outputs.iter().enumerate() {
                    assert_eq!(name, &format!("h_{}.pdb", i + 1));
                    let expected: Vec<i32> = (0..n)
                        .flat_map(|p| std::iter::repeat(10 + i as i32 + p).take(3))
                        .collect();
                    assert_eq!(seqs(body), expected, "k={} n={} window={}", k, n, i + 1);
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_too_short() {
        set_chain_aware_windows(false);
        let content = residues(1..=2, 2);
        assert!(slice_windows(content.as_bytes(), "h", 3).is_empty());
        assert!(slice_windows(content.as_bytes(), "h", 0).is_empty());
        assert!(slice_windows(b"", "h", 1).is_empty());
    }

    #[test]
    #[serial]
    fn test_whole_region_single_window() {
        set_chain_aware_windows(false);
        let content = residues(1..=4, 2);
        let outputs = slice_windows(content.as_bytes(), "h", 4);

        assert_eq!(outputs.len(), 1);
        assert_eq!(seqs(&outputs[0].1), vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    #[serial]
    fn test_insertion_codes_are_positions() {
        set_chain_aware_windows(false);
        let lines = vec![
            atom_line(1, " CA ", 'A', 52, ' '),
            atom_line(2, " CA ", 'A', 52, 'A'),
            atom_line(3, " CA ", 'A', 53, ' '),
        ];
        let content = pdb_file(&lines);

        let total = count_positions(pdb::atoms(content.as_bytes()), false);
        assert_eq!(total, 3);
        assert_eq!(slice_windows(content.as_bytes(), "h", 2).len(), 2);
    }

    #[test]
    #[serial]
    fn test_chain_naive_counting() {
        let lines = vec![
            atom_line(1, " CA ", 'A', 5, ' '),
            atom_line(2, " CA ", 'B', 5, ' '),
            atom_line(3, " CA ", 'B', 6, ' '),
        ];
        let content = pdb_file(&lines);

        // Same key on two chains counts once by default
        set_chain_aware_windows(false);
        assert_eq!(count_positions(pdb::atoms(content.as_bytes()), false), 2);
        let outputs = slice_windows(content.as_bytes(), "h", 2);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].1.lines().count(), 3);

        set_chain_aware_windows(true);
        assert_eq!(count_positions(pdb::atoms(content.as_bytes()), true), 3);
        assert_eq!(slice_windows(content.as_bytes(), "h", 2).len(), 2);
        set_chain_aware_windows(false);
    }

    #[test]
    #[serial]
    fn test_stats() {
        set_chain_aware_windows(false);
        let content = residues(1..=5, 2);
        let mut factory = MemorySinkFactory::new();
        let stats = slice_content(content.as_bytes(), "h", 3, &mut factory).unwrap();

        assert_eq!(stats.atoms, 10);
        assert_eq!(stats.positions, 5);
        assert_eq!(stats.windows, 3);
        assert_eq!(stats.records_written, 18);
        assert_eq!(stats.max_open, 3);
    }

    #[test]
    #[serial]
    fn test_run_rejects_zero_window() {
        let cmd = SliceCommand {
            window: 0,
            low_memory: false,
        };
        let result = cmd.run("/nonexistent/helixcut/in.pdb", "/tmp");
        assert!(matches!(result, Err(PdbError::InvalidInput(_))));
    }
}
