//! Output sinks for extracted regions and sliding windows.
//!
//! The multiplexers never create files themselves: they ask a [`SinkFactory`]
//! for a sink when a region or window starts, write one record per line to
//! it, and hand it back to the factory exactly once when it ends.

use crate::pdb::{PdbError, Result};
use crate::streaming::buffers::{DEFAULT_MEMORY_SINK, DEFAULT_SINK_BUFFER};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "pdb";

/// Identity of a sink, which also determines its output name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkId<'a> {
    /// An extracted helix: `{length}_{base}_{ordinal}.pdb`
    Region {
        length: u32,
        base: &'a str,
        ordinal: usize,
    },
    /// A sliding window: `{base}_{ordinal}.pdb`
    Window { base: &'a str, ordinal: usize },
}

impl fmt::Display for SinkId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkId::Region {
                length,
                base,
                ordinal,
            } => write!(f, "{}_{}_{}.{}", length, base, ordinal, OUTPUT_EXTENSION),
            SinkId::Window { base, ordinal } => {
                write!(f, "{}_{}.{}", base, ordinal, OUTPUT_EXTENSION)
            }
        }
    }
}

/// Destination for the records of one region or window.
pub trait RecordSink {
    /// Write one record followed by a newline.
    fn write_record(&mut self, line: &[u8]) -> Result<()>;
}

/// Creates sinks and finalizes them.
pub trait SinkFactory {
    type Sink: RecordSink;

    /// Open the sink for a region or window that starts at the current record.
    fn open(&mut self, id: SinkId<'_>) -> Result<Self::Sink>;

    /// Finalize a sink. Called exactly once per opened sink on success paths;
    /// on error paths the sink is dropped instead.
    fn close(&mut self, sink: Self::Sink) -> Result<()>;
}

/// Buffered output file.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl RecordSink for FileSink {
    #[inline]
    fn write_record(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line).map_err(PdbError::Io)?;
        self.writer.write_all(b"\n").map_err(PdbError::Io)?;
        Ok(())
    }
}

/// Creates one file per sink inside an output directory.
///
/// Existing files with the same name are truncated, so re-running over the
/// same input reproduces the same output set.
#[derive(Debug, Clone)]
pub struct FileSinkFactory {
    out_dir: PathBuf,
    capacity: usize,
    written: Vec<PathBuf>,
}

impl FileSinkFactory {
    /// Create a factory writing into `out_dir` with the default buffer size.
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        Self::with_capacity(out_dir, DEFAULT_SINK_BUFFER)
    }

    /// Create a factory with a specific per-sink buffer size.
    pub fn with_capacity<P: AsRef<Path>>(out_dir: P, capacity: usize) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            capacity,
            written: Vec::new(),
        }
    }

    /// Paths of all files created so far, in creation order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SinkFactory for FileSinkFactory {
    type Sink = FileSink;

    fn open(&mut self, id: SinkId<'_>) -> Result<FileSink> {
        let path = self.out_dir.join(id.to_string());
        let file = File::create(&path)?;
        self.written.push(path);
        Ok(FileSink {
            writer: BufWriter::with_capacity(self.capacity, file),
        })
    }

    fn close(&mut self, mut sink: FileSink) -> Result<()> {
        sink.writer.flush().map_err(PdbError::Io)
    }
}

/// In-memory sink.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    buf: Vec<u8>,
}

impl RecordSink for MemorySink {
    #[inline]
    fn write_record(&mut self, line: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(line);
        self.buf.push(b'\n');
        Ok(())
    }
}

/// Collects closed sinks as `(name, content)` pairs, in close order.
#[derive(Debug, Default)]
pub struct MemorySinkFactory {
    outputs: Vec<(String, String)>,
}

impl MemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the factory, returning the closed sinks sorted by name.
    pub fn into_outputs(mut self) -> Vec<(String, String)> {
        self.outputs.sort_by(|a, b| a.0.cmp(&b.0));
        self.outputs
    }
}

impl SinkFactory for MemorySinkFactory {
    type Sink = MemorySink;

    fn open(&mut self, id: SinkId<'_>) -> Result<MemorySink> {
        Ok(MemorySink {
            name: id.to_string(),
            buf: Vec::with_capacity(DEFAULT_MEMORY_SINK),
        })
    }

    fn close(&mut self, sink: MemorySink) -> Result<()> {
        let content = String::from_utf8_lossy(&sink.buf).into_owned();
        self.outputs.push((sink.name, content));
        Ok(())
    }
}
