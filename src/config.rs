//! Global configuration for helixcut runtime behavior.
//!
//! This module provides thread-safe global configuration that affects
//! how residue positions are counted without adding overhead to hot loops.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::record::{AtomRecord, RecordKey};

/// Global flag for chain-aware sliding windows.
///
/// By default the slicer counts a new distinct position only when the
/// `(sequence number, insertion code)` key changes, ignoring the chain.
/// Two adjacent residues on different chains that share a key are then
/// counted as one position.
///
/// When enabled, a chain change also starts a new position.
static CHAIN_AWARE_WINDOWS: AtomicBool = AtomicBool::new(false);

/// Enable or disable chain-aware window counting.
///
/// # Example
///
/// ```
/// use helixcut::config;
///
/// // Enable at startup before any slicing
/// config::set_chain_aware_windows(true);
/// assert!(config::is_chain_aware_windows());
/// config::set_chain_aware_windows(false);
/// ```
#[inline]
pub fn set_chain_aware_windows(enabled: bool) {
    CHAIN_AWARE_WINDOWS.store(enabled, Ordering::Release);
}

/// Check if chain-aware window counting is enabled.
#[inline]
pub fn is_chain_aware_windows() -> bool {
    CHAIN_AWARE_WINDOWS.load(Ordering::Acquire)
}

/// Identity of the residue position an atom belongs to, for window counting.
///
/// The chain component is always a space unless chain-aware mode is on.
/// Read the flag once per pass and pass it in, not per atom.
#[inline]
pub fn position_of(atom: &AtomRecord<'_>, chain_aware: bool) -> (RecordKey, char) {
    if chain_aware {
        (atom.key, atom.chain_id)
    } else {
        (atom.key, ' ')
    }
}
