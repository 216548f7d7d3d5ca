//! helixcut: helix extraction, slicing and deduplication for PDB files
//!
//! Usage: helixcut <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use helixcut::batch::{
    collect_files, run_batch, split_stem_collisions, BatchReport, BatchStats, Progress,
};
use helixcut::commands::{DedupCommand, ExtractCommand, SliceCommand};
use helixcut::pdb::{PdbError, Result};

#[derive(Parser)]
#[command(name = "helixcut")]
#[command(version)]
#[command(about = "helixcut: extract, slice and deduplicate helices from PDB files", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Count a chain change as a new residue position when slicing.
    /// By default only (sequence number, insertion code) changes count,
    /// so equal keys on adjacent chains form one position.
    #[arg(long, global = true)]
    chain_aware_windows: bool,

    /// Log skipped records and descriptors
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Do not print batch progress
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every helix of a PDB file into its own file
    Extract {
        /// Input PDB file, or directory of PDB files
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Use small output buffers
        #[arg(long)]
        low_memory: bool,

        /// Print extraction statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Slice helices into overlapping windows of n residues
    Slice {
        /// Input PDB file, or directory of PDB files
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Residues per window
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        window: u32,

        /// Use small output buffers
        #[arg(long)]
        low_memory: bool,

        /// Print slicing statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Keep one structure per alpha-carbon sequence
    Dedup {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the non-redundant files
        #[arg(short, long)]
        output: PathBuf,

        /// Only report what would be kept
        #[arg(long)]
        dry_run: bool,

        /// Print dedup statistics to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Must be set before any slicing occurs
    if cli.chain_aware_windows {
        helixcut::config::set_chain_aware_windows(true);
    }

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            low_memory,
            stats,
        } => run_extract(input, output, low_memory, stats, cli.quiet),

        Commands::Slice {
            input,
            output,
            window,
            low_memory,
            stats,
        } => run_slice(input, output, window as usize, low_memory, stats, cli.quiet),

        Commands::Dedup {
            input,
            output,
            dry_run,
            stats,
        } => run_dedup(input, output, dry_run, stats),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PdbError::InvalidInput(format!(
            "output directory does not exist: {}",
            path.display()
        )))
    }
}

/// Run `op` on a single file, or on every file under a directory.
///
/// Files whose stem repeats an earlier file's are reported as failed, since
/// their outputs would overwrite each other. A batch fails as a whole only if
/// every file failed.
fn run_files<S, F>(input: &Path, quiet: bool, op: F) -> Result<S>
where
    S: BatchStats,
    F: Fn(&Path) -> Result<S> + Sync + Send,
{
    if !input.is_dir() {
        return op(input);
    }

    let (files, clashes) = split_stem_collisions(collect_files(input)?);
    let progress = Progress::new(files.len(), quiet);
    let mut report: BatchReport<S> = run_batch(&files, &progress, op);
    report.failures.extend(clashes);

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed(),
        "batch finished"
    );
    if report.succeeded == 0 && report.failed() > 0 {
        return Err(PdbError::InvalidInput(format!(
            "all {} files failed",
            report.failed()
        )));
    }
    Ok(report.stats)
}

fn run_extract(
    input: PathBuf,
    output: PathBuf,
    low_memory: bool,
    stats: bool,
    quiet: bool,
) -> Result<()> {
    ensure_dir(&output)?;

    let mut cmd = ExtractCommand::new();
    cmd.low_memory = low_memory;

    let result = run_files(&input, quiet, |path| cmd.run(path, &output))?;
    if stats {
        eprintln!("Extract stats: {}", result);
    }
    Ok(())
}

fn run_slice(
    input: PathBuf,
    output: PathBuf,
    window: usize,
    low_memory: bool,
    stats: bool,
    quiet: bool,
) -> Result<()> {
    ensure_dir(&output)?;

    let mut cmd = SliceCommand::new();
    cmd.window = window;
    cmd.low_memory = low_memory;

    let result = run_files(&input, quiet, |path| cmd.run(path, &output))?;
    if stats {
        eprintln!("Slice stats: {}", result);
    }
    Ok(())
}

fn run_dedup(input: PathBuf, output: PathBuf, dry_run: bool, stats: bool) -> Result<()> {
    let mut cmd = DedupCommand::new();
    cmd.dry_run = dry_run;

    let result = cmd.run(&input, &output)?;
    println!("Found {} duplicate(s)!", result.duplicates);
    if stats {
        eprintln!("Dedup stats: {}", result);
    }
    Ok(())
}
