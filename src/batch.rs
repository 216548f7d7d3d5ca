//! Batch processing of PDB directories using Rayon.
//!
//! Every file is processed independently: a failure is logged and counted
//! for that file, and the batch continues with the others.

use crate::pdb::{self, PdbError, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

/// Per-file statistics that can be summed over a batch.
pub trait BatchStats: Default + Send {
    fn merge(&mut self, other: &Self);
}

/// Collect every regular file under `dir`, recursively, sorted by path.
///
/// Unreadable subdirectories are logged and skipped.
pub fn collect_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PdbError::InvalidInput(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let files = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Split off files whose stem was already used by an earlier file.
///
/// Output names are derived from the input stem only, so two inputs sharing
/// a stem would write the same outputs. The first file in order keeps the
/// stem; each later one is returned as a failure naming the file it clashes
/// with.
pub fn split_stem_collisions(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<(PathBuf, PdbError)>) {
    let mut owners: FxHashMap<String, usize> = FxHashMap::default();
    let mut unique: Vec<PathBuf> = Vec::with_capacity(files.len());
    let mut clashes = Vec::new();
    for path in files {
        let stem = pdb::base_name(&path);
        if let Some(&owner) = owners.get(&stem) {
            let error = PdbError::InvalidInput(format!(
                "output names of {} collide with {}",
                path.display(),
                unique[owner].display()
            ));
            tracing::warn!(path = %path.display(), error = %error, "skipping file");
            clashes.push((path, error));
        } else {
            owners.insert(stem, unique.len());
            unique.push(path);
        }
    }
    (unique, clashes)
}

/// Percentage progress over a fixed number of files.
#[derive(Debug)]
pub struct Progress {
    total: usize,
    done: AtomicUsize,
    quiet: bool,
}

impl Progress {
    pub fn new(total: usize, quiet: bool) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            quiet,
        }
    }

    /// Mark one file done and print the completed percentage.
    pub fn tick(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let percent = if self.total == 0 {
            100
        } else {
            done * 100 / self.total
        };
        if !self.quiet {
            println!("{}%", percent);
        }
        percent
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport<S> {
    /// Statistics summed over successful files
    pub stats: S,
    pub succeeded: usize,
    pub failures: Vec<(PathBuf, PdbError)>,
}

impl<S> BatchReport<S> {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Run `op` on every file in parallel.
///
/// Files share no state; each run owns its own sinks, so a failing file
/// cannot affect the output of another.
pub fn run_batch<S, F>(files: &[PathBuf], progress: &Progress, op: F) -> BatchReport<S>
where
    S: BatchStats,
    F: Fn(&Path) -> Result<S> + Sync + Send,
{
    let results: Vec<Result<S>> = files
        .par_iter()
        .map(|path| {
            let result = op(path.as_path());
            progress.tick();
            result
        })
        .collect();

    let mut report = BatchReport {
        stats: S::default(),
        succeeded: 0,
        failures: Vec::new(),
    };
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(stats) => {
                report.stats.merge(&stats);
                report.succeeded += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to process file");
                report.failures.push((path.clone(), e));
            }
        }
    }
    report
}
