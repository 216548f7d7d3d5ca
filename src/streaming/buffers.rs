//! Buffer size constants for streaming operations.
//!
//! Extraction and slicing keep one buffered writer per open sink, and a file
//! can have dozens of overlapping windows open at once, so sink buffers are
//! kept small.

/// Default sink buffer size (64 KB).
/// A typical helix or window is a few kilobytes, so most sinks are written
/// out with a single flush on close.
pub const DEFAULT_SINK_BUFFER: usize = 64 * 1024;

/// Low-memory sink buffer size (8 KB).
pub const LOW_MEMORY_SINK_BUFFER: usize = 8 * 1024;

/// Initial capacity of an in-memory sink (4 KB).
pub const DEFAULT_MEMORY_SINK: usize = 4 * 1024;

/// Returns the appropriate sink buffer size based on low_memory flag.
#[inline]
pub const fn sink_buffer_size(low_memory: bool) -> usize {
    if low_memory {
        LOW_MEMORY_SINK_BUFFER
    } else {
        DEFAULT_SINK_BUFFER
    }
}
