//! Open sink management for streaming multiplexers.
//!
//! [`OpenSinks`] maps sink identities to the state of every currently open
//! region or window. Each record is routed through the whole set in one step;
//! sinks that end on that record are collected during the step and removed
//! after it, so the map is never modified while it is being iterated.

use rustc_hash::FxHashMap;

/// Outcome of routing one record to an open sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The sink stays open
    Keep,
    /// The sink's termination condition fired; close it
    Evict,
}

/// Set of open sinks keyed by an identity assigned on insertion.
///
/// A sink leaves the set only by eviction or by [`OpenSinks::drain`], and an
/// identity is never reused.
#[derive(Debug)]
pub struct OpenSinks<T> {
    open: FxHashMap<usize, T>,
    /// Identity handed to the next inserted sink.
    next_id: usize,
    /// Maximum observed open count (for statistics).
    max_open: usize,
}

impl<T> Default for OpenSinks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OpenSinks<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            open: FxHashMap::default(),
            next_id: 0,
            max_open: 0,
        }
    }

    /// Open a sink, returning its identity.
    #[inline]
    pub fn insert(&mut self, value: T) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(id, value);
        self.max_open = self.max_open.max(self.open.len());
        id
    }

    /// Number of open sinks.
    #[inline]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Total number of sinks ever opened.
    pub fn total_opened(&self) -> usize {
        self.next_id
    }

    /// Maximum number of sinks open at the same time.
    pub fn max_open(&self) -> usize {
        self.max_open
    }

    /// Route the current record through every open sink.
    ///
    /// `step` is called once per open sink and decides whether it stays open.
    /// Evicted sinks are returned in opening order; the caller closes them.
    /// If `step` fails, routing stops and the remaining sinks stay open.
    pub fn route<F, E>(&mut self, mut step: F) -> Result<Vec<T>, E>
    where
        F: FnMut(&mut T) -> Result<Route, E>,
    {
        let mut expired: Vec<usize> = Vec::new();
        for (&id, sink) in self.open.iter_mut() {
            if step(sink)? == Route::Evict {
                expired.push(id);
            }
        }
        expired.sort_unstable();
        Ok(expired
            .into_iter()
            .filter_map(|id| self.open.remove(&id))
            .collect())
    }

    /// Remove every open sink, in opening order.
    pub fn drain(&mut self) -> Vec<T> {
        let mut remaining: Vec<(usize, T)> = self.open.drain().collect();
        remaining.sort_unstable_by_key(|(id, _)| *id);
        remaining.into_iter().map(|(_, sink)| sink).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_unique_ids() {
        let mut set: OpenSinks<&str> = OpenSinks::new();
        let a = set.insert("a");
        let b = set.insert("b");

        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_opened(), 2);
    }

    #[test]
    fn test_route_evicts_after_step() {
        let mut set: OpenSinks<u32> = OpenSinks::new();
        for end in [3, 1, 5, 1] {
            set.insert(end);
        }

        let mut visited = 0;
        let evicted = set
            .route(|end| {
                visited += 1;
                Ok::<_, ()>(if *end <= 1 { Route::Evict } else { Route::Keep })
            })
            .unwrap();

        // Every sink sees the record, including the ones evicted on it
        assert_eq!(visited, 4);
        assert_eq!(evicted, vec![1, 1]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.max_open(), 4);
    }

    #[test]
    fn test_route_error_keeps_sinks() {
        let mut set: OpenSinks<u32> = OpenSinks::new();
        set.insert(1);
        set.insert(2);

        let result = set.route(|_| Err::<Route, &str>("write failed"));
        assert_eq!(result, Err("write failed"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_drain_in_opening_order() {
        let mut set: OpenSinks<char> = OpenSinks::new();
        for c in ['x', 'y', 'z'] {
            set.insert(c);
        }
        set.route(|c| Ok::<_, ()>(if *c == 'y' { Route::Evict } else { Route::Keep }))
            .unwrap();

        assert_eq!(set.drain(), vec!['x', 'z']);
        assert!(set.is_empty());
        // Identities are never reused
        set.insert('w');
        assert_eq!(set.total_opened(), 4);
    }
}
