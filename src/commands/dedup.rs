//! Removal of structures with identical sequences.
//!
//! Two files are duplicates when their alpha-carbon residue sequences are
//! identical. The sequence is read from the `CA` atoms in file order and
//! reduced to a SHA-256 checksum. Files containing any `CA` atom with an
//! alternate location are ambiguous and take no part in the comparison.
//!
//! The first file of each checksum, in directory walk order, is moved to the
//! output directory; duplicates and excluded files stay where they are.

use crate::batch::collect_files;
use crate::pdb::{self, PdbError, Result};
use crate::streaming::parsing::{
    classify_line, column_char, field, lines, trim_field, RecordKind, ALT_LOC, ATOM_NAME,
    RESIDUE_NAME,
};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Checksum of the alpha-carbon residue sequence of a file.
///
/// Returns None if any alpha carbon has an alternate location.
pub fn sequence_checksum(content: &[u8]) -> Option<String> {
    let mut hasher = Sha256::new();
    for line in lines(content) {
        if classify_line(line) != RecordKind::Atom {
            continue;
        }
        let is_ca = field(line, ATOM_NAME).is_some_and(|name| trim_field(name) == b"CA");
        if !is_ca {
            continue;
        }
        if column_char(line, ALT_LOC) != ' ' {
            return None;
        }
        if let Some(residue) = field(line, RESIDUE_NAME) {
            hasher.update(trim_field(residue));
        }
    }
    Some(format!("{:x}", hasher.finalize()))
}

/// Dedup command configuration.
#[derive(Debug, Clone, Default)]
pub struct DedupCommand {
    /// Report what would be kept without moving anything
    pub dry_run: bool,
}

impl DedupCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum one file.
    pub fn checksum<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
        let content = pdb::read_file(path)?;
        Ok(sequence_checksum(&content))
    }

    /// Select the first file per checksum from `paths`, in order.
    ///
    /// Checksums are computed in parallel; selection is sequential so the
    /// result only depends on the order of `paths`.
    pub fn select(&self, paths: &[PathBuf]) -> Selection {
        let checksums: Vec<Result<Option<String>>> =
            paths.par_iter().map(Self::checksum).collect();

        let mut selection = Selection::default();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for (path, checksum) in paths.iter().zip(checksums) {
            match checksum {
                Ok(Some(sum)) => {
                    selection.stats.compared += 1;
                    if seen.insert(sum) {
                        selection.keep.push(path.clone());
                    } else {
                        tracing::debug!(path = %path.display(), "duplicate sequence");
                        selection.stats.duplicates += 1;
                    }
                }
                Ok(None) => {
                    tracing::debug!(path = %path.display(), "alternate location on alpha carbon, not compared");
                    selection.stats.excluded += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                    selection.stats.failed += 1;
                }
            }
        }
        selection.stats.kept = selection.keep.len();
        selection
    }

    /// Move the first file of each sequence under `in_dir` into `out_dir`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, in_dir: P, out_dir: Q) -> Result<DedupStats> {
        let out_dir = out_dir.as_ref();
        if !out_dir.is_dir() {
            return Err(PdbError::InvalidInput(format!(
                "output directory does not exist: {}",
                out_dir.display()
            )));
        }

        let paths = collect_files(in_dir)?;
        let Selection { keep, mut stats } = self.select(&paths);
        stats.files = paths.len();

        if self.dry_run {
            for path in &keep {
                tracing::info!(path = %path.display(), "would keep");
            }
            return Ok(stats);
        }

        // Kept files from different subdirectories may share a file name
        let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();
        for path in &keep {
            let Some(name) = path.file_name() else {
                continue;
            };
            let target = out_dir.join(name);
            if target.exists() || !claimed.insert(target.clone()) {
                tracing::warn!(
                    path = %path.display(),
                    target = %target.display(),
                    "output name already taken, leaving file in place"
                );
                stats.failed += 1;
                stats.kept -= 1;
                continue;
            }
            if let Err(e) = fs::rename(path, &target) {
                tracing::warn!(path = %path.display(), error = %e, "failed to move file");
                stats.failed += 1;
                stats.kept -= 1;
            }
        }
        Ok(stats)
    }
}

/// Files chosen to survive, in input order.
#[derive(Debug, Default)]
pub struct Selection {
    pub keep: Vec<PathBuf>,
    pub stats: DedupStats,
}

/// Statistics from a dedup run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupStats {
    pub files: usize,
    /// Files with a checksum
    pub compared: usize,
    /// Files with an alternate-location alpha carbon
    pub excluded: usize,
    pub failed: usize,
    pub kept: usize,
    /// Compared files whose sequence was already kept
    pub duplicates: usize,
}

impl std::fmt::Display for DedupStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files: {}, Compared: {}, Excluded: {}, Failed: {}, Kept: {}, Duplicates: {}",
            self.files,
            self.compared,
            self.excluded,
            self.failed,
            self.kept,
            self.duplicates
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{atom_line_alt, pdb_file};

    fn structure(residues: &[&str], alt_ca: Option<usize>) -> String {
        let mut lines = vec!["HEADER    TEST".to_string()];
        for (i, res) in residues.iter().enumerate() {
            let seq = i as i32 + 1;
            let alt = if alt_ca == Some(i) { 'A' } else { ' ' };
            lines.push(atom_line_alt(3 * i as u32 + 1, " N  ", ' ', res, 'A', seq, ' '));
            lines.push(atom_line_alt(3 * i as u32 + 2, " CA ", alt, res, 'A', seq, ' '));
            lines.push(atom_line_alt(3 * i as u32 + 3, " C  ", ' ', res, 'A', seq, ' '));
        }
        pdb_file(&lines)
    }

    #[test]
    fn test_same_sequence_same_checksum() {
        let a = structure(&["MET", "ALA", "GLY"], None);
        // Records other than alpha carbons don't matter
        let b = format!("REMARK   1 something\n{}", structure(&["MET", "ALA", "GLY"], None));
        let c = structure(&["MET", "GLY", "ALA"], None);

        let sa = sequence_checksum(a.as_bytes()).unwrap();
        assert_eq!(Some(sa.clone()), sequence_checksum(b.as_bytes()));
        assert_ne!(Some(sa), sequence_checksum(c.as_bytes()));
    }

    #[test]
    fn test_alt_loc_excluded() {
        let a = structure(&["MET", "ALA", "GLY"], Some(1));
        assert_eq!(sequence_checksum(a.as_bytes()), None);
    }

    #[test]
    fn test_alt_loc_on_other_atom_is_fine() {
        let lines = vec![
            atom_line_alt(1, " N  ", 'A', "MET", 'A', 1, ' '),
            atom_line_alt(2, " CA ", ' ', "MET", 'A', 1, ' '),
        ];
        assert!(sequence_checksum(pdb_file(&lines).as_bytes()).is_some());
    }

    #[test]
    fn test_select_first_hit_wins() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("a.pdb", structure(&["MET", "ALA"], None)),
            ("b.pdb", structure(&["MET", "ALA"], None)),
            ("c.pdb", structure(&["GLY"], None)),
            ("d.pdb", structure(&["GLY"], Some(0))),
        ];
        let mut paths = Vec::new();
        for (name, content) in &files {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            paths.push(path);
        }
        paths.push(dir.path().join("missing.pdb"));

        let selection = DedupCommand::new().select(&paths);

        assert_eq!(selection.keep, vec![paths[0].clone(), paths[2].clone()]);
        assert_eq!(selection.stats.compared, 3);
        assert_eq!(selection.stats.excluded, 1);
        assert_eq!(selection.stats.failed, 1);
        assert_eq!(selection.stats.kept, 2);
        assert_eq!(selection.stats.duplicates, 1);
    }

    #[test]
    fn test_run_same_name_in_two_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        fs::create_dir_all(input.join("x")).unwrap();
        fs::create_dir_all(input.join("y")).unwrap();
        fs::create_dir(&out).unwrap();
        fs::write(input.join("x").join("1abc.pdb"), structure(&["MET"], None)).unwrap();
        fs::write(input.join("y").join("1abc.pdb"), structure(&["GLY"], None)).unwrap();

        let stats = DedupCommand::new().run(&input, &out).unwrap();

        assert_eq!(stats.duplicates, 0);
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.failed, 1);
        // First in walk order is moved, the other stays where it was
        let moved = fs::read_to_string(out.join("1abc.pdb")).unwrap();
        assert!(moved.contains("MET"));
        assert!(!input.join("x").join("1abc.pdb").exists());
        assert!(input.join("y").join("1abc.pdb").exists());
    }

    #[test]
    fn test_run_existing_target_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let out = dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::create_dir(&out).unwrap();
        fs::write(input.join("1abc.pdb"), structure(&["MET"], None)).unwrap();
        fs::write(out.join("1abc.pdb"), "existing").unwrap();

        let stats = DedupCommand::new().run(&input, &out).unwrap();

        assert_eq!(stats.kept, 0);
        assert_eq!(stats.failed, 1);
        assert_eq!(fs::read_to_string(out.join("1abc.pdb")).unwrap(), "existing");
        assert!(input.join("1abc.pdb").exists());
    }

    #[test]
    fn test_run_requires_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = DedupCommand::new().run(dir.path(), dir.path().join("nope"));
        assert!(matches!(result, Err(PdbError::InvalidInput(_))));
    }
}
