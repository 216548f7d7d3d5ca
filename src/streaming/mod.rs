//! Centralized streaming utilities for helixcut.
//!
//! This module provides shared components for the multiplexing commands:
//! - Zero-allocation fixed-column PDB parsing
//! - Open sink management keyed by sink identity
//! - File-backed and in-memory output sinks
//!
//! Memory held by a multiplexing pass is O(k) where k = max sinks open at once.

pub mod active_set;
pub mod buffers;
pub mod parsing;
pub mod sink;

pub use active_set::{OpenSinks, Route};
pub use parsing::{classify_line, lines, parse_i32_field, RecordKind};
pub use sink::{
    FileSink, FileSinkFactory, MemorySink, MemorySinkFactory, RecordSink, SinkFactory, SinkId,
};
