//! Core data types for the TUI application
//!
//! - `DataSlice`: the current snapshot of one entity kind with generation
//!   and staleness tracking

use std::time::{Duration, Instant};

use jqmon::models::{EntityKind, Snapshot};

/// Latest snapshot for one kind plus bookkeeping about when and from which
/// fetch generation it was applied.
#[derive(Debug)]
pub struct DataSlice {
    snapshot: Snapshot,
    generation: u64,
    pub last_updated: Option<Instant>,
    pub stale_threshold: Duration,
}

impl DataSlice {
    pub fn new(kind: EntityKind, stale_threshold: Duration) -> Self {
        Self {
            snapshot: Snapshot::empty(kind),
            generation: 0,
            last_updated: None,
            stale_threshold,
        }
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.last_updated
            .map(|t| t.elapsed() > self.stale_threshold)
            .unwrap_or(true)
    }

    #[must_use]
    pub fn age(&self) -> Option<Duration> {
        self.last_updated.map(|t| t.elapsed())
    }

    /// Whether a result of `generation` is newer than what is shown.
    #[must_use]
    pub fn accepts(&self, generation: u64) -> bool {
        generation > self.generation
    }

    /// Swap in a new snapshot. Results from older generations are ignored
    /// and `false` is returned.
    pub fn update(&mut self, generation: u64, snapshot: Snapshot) -> bool {
        if !self.accepts(generation) {
            tracing::debug!(
                kind = %self.snapshot.kind(),
                generation,
                applied = self.generation,
                "dropping outdated snapshot"
            );
            return false;
        }
        self.snapshot = snapshot;
        self.generation = generation;
        self.last_updated = Some(Instant::now());
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.last_updated.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_slice_starts_stale_and_empty() {
        let slice = DataSlice::new(EntityKind::Job, Duration::from_secs(15));
        assert!(slice.is_stale());
        assert!(!slice.is_loaded());
        assert!(slice.snapshot().is_empty());
        assert_eq!(slice.age(), None);
    }

    #[test]
    fn test_data_slice_ignores_older_generations() {
        let mut slice = DataSlice::new(EntityKind::Queue, Duration::from_secs(30));
        let newer = Snapshot::empty(EntityKind::Queue);

        assert!(slice.update(3, newer.clone()));
        assert!(!slice.is_stale());
        assert!(!slice.update(2, Snapshot::empty(EntityKind::Queue)));
        assert!(!slice.update(3, Snapshot::empty(EntityKind::Queue)));

        assert_eq!(slice.generation(), 3);
        assert!(slice.snapshot().ptr_eq(&newer));
    }
}
