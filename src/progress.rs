//! Watch progress: last playback position per title

use crate::models::WatchProgress;

/// Positions this close to the end count as finished
const FINISHED_MARGIN_SECS: f64 = 5.0;
/// Minimum playback time between persisted snapshots
const SAVE_INTERVAL_SECS: f64 = 5.0;
const MAX_ENTRIES: usize = 50;

#[derive(Debug, Default)]
pub struct ProgressStore {
    entries: Vec<WatchProgress>,
    last_saved_position: Option<f64>,
    dirty: bool,
}

impl ProgressStore {
    pub fn new(entries: Vec<WatchProgress>) -> Self {
        Self {
            entries,
            last_saved_position: None,
            dirty: false,
        }
    }

    pub fn entries(&self) -> &[WatchProgress] {
        &self.entries
    }

    /// Record a position. Most recent entries are kept first.
    pub fn record(&mut self, key: &str, title: &str, position: f64, duration: f64) {
        if !position.is_finite() || position < 0.0 {
            return;
        }

        let now = chrono::Utc::now().timestamp();
        if let Some(idx) = self.entries.iter().position(|e| e.key == key) {
            let mut entry = self.entries.remove(idx);
            entry.position = position;
            if duration > 0.0 {
                entry.duration = duration;
            }
            entry.updated_at = now;
            self.entries.insert(0, entry);
        } else {
            self.entries.insert(
                0,
                WatchProgress {
                    key: key.to_string(),
                    title: title.to_string(),
                    position,
                    duration,
                    updated_at: now,
                },
            );
            self.entries.truncate(MAX_ENTRIES);
        }

        let due = match self.last_saved_position {
            Some(saved) => (position - saved).abs() >= SAVE_INTERVAL_SECS,
            None => true,
        };
        if due {
            self.dirty = true;
        }
    }

    /// True once per save interval; the caller persists `entries()` then.
    pub fn take_dirty(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.last_saved_position = self.entries.first().map(|e| e.position);
        true
    }

    /// Force the next `take_dirty` (used when the player closes)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Where to start playback for `key`; 0 when unseen or already finished
    pub fn resume_position(&self, key: &str) -> f64 {
        let Some(entry) = self.entries.iter().find(|e| e.key == key) else {
            return 0.0;
        };
        if entry.duration > 0.0 && entry.position >= entry.duration - FINISHED_MARGIN_SECS {
            0.0
        } else {
            entry.position
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_position() {
        let mut store = ProgressStore::default();
        assert_eq!(store.resume_position("tt1"), 0.0);

        store.record("tt1", "Alien", 120.0, 600.0);
        assert_eq!(store.resume_position("tt1"), 120.0);

        store.record("tt1", "Alien", 597.0, 600.0);
        assert_eq!(store.resume_position("tt1"), 0.0);
    }

    #[test]
    fn test_unknown_duration_resumes() {
        let mut store = ProgressStore::default();
        store.record("tt1", "Alien", 30.0, 0.0);
        assert_eq!(store.resume_position("tt1"), 30.0);
    }

    #[test]
    fn test_most_recent_first() {
        let mut store = ProgressStore::default();
        store.record("tt1", "Alien", 10.0, 100.0);
        store.record("tt2", "Heat", 10.0, 100.0);
        store.record("tt1", "Alien", 20.0, 100.0);
        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.entries()[0].key, "tt1");
        assert_eq!(store.entries()[0].position, 20.0);
    }

    #[test]
    fn test_save_throttling() {
        let mut store = ProgressStore::default();
        store.record("tt1", "Alien", 1.0, 100.0);
        assert!(store.take_dirty());
        assert!(!store.take_dirty());

        store.record("tt1", "Alien", 3.0, 100.0);
        assert!(!store.take_dirty());

        store.record("tt1", "Alien", 6.5, 100.0);
        assert!(store.take_dirty());

        store.mark_dirty();
        assert!(store.take_dirty());
    }

    #[test]
    fn test_ignores_invalid_positions() {
        let mut store = ProgressStore::default();
        store.record("tt1", "Alien", f64::NAN, 100.0);
        store.record("tt1", "Alien", -1.0, 100.0);
        assert!(store.entries().is_empty());
    }
}
