// Session accountant - elapsed time and beat totals for the practice session

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::storage::{MetronomeStore, NewSession, SessionUpdate};

/// Cached view of the open session so ticks do not have to re-read the store
#[derive(Debug, Clone)]
struct OpenSession {
    start_time: DateTime<Utc>,
    total_beats: u64,
}

/// Tracks the current practice session: opened on start, updated on every
/// tick, closed on stop. The stored record is replaced wholesale on each
/// update, so ticks at the fastest tempo (300ms apart at 200 BPM) cannot
/// corrupt it.
pub struct SessionTracker {
    store: Arc<MetronomeStore>,
    open: Option<OpenSession>,
    // Display counters zero independently of the stored record
    display_start: DateTime<Utc>,
    display_beat_offset: u64,
}

impl SessionTracker {
    pub fn new(store: Arc<MetronomeStore>) -> Self {
        Self {
            store,
            open: None,
            display_start: Utc::now(),
            display_beat_offset: 0,
        }
    }

    /// Open a session unless one is already open.
    ///
    /// An open record left behind by a previous run is re-attached to rather
    /// than duplicated, preserving the at-most-one-open-session invariant.
    pub fn open(&mut self, bpm: u16) {
        if self.open.is_some() {
            return;
        }

        let open = match self.store.open_session() {
            Some(existing) => {
                log::info!("re-attaching to open session {}", existing.id);
                OpenSession {
                    start_time: existing.start_time,
                    total_beats: existing.total_beats,
                }
            }
            None => {
                let session = self.store.save_session(NewSession {
                    start_time: Utc::now(),
                    average_bpm: bpm,
                });
                OpenSession {
                    start_time: session.start_time,
                    total_beats: 0,
                }
            }
        };

        self.display_start = open.start_time;
        self.display_beat_offset = 0;
        self.open = Some(open);
    }

    /// Account one dispatched beat and persist the updated record
    pub fn on_tick(&mut self, bpm: u16) {
        let Some(open) = self.open.as_mut() else {
            return;
        };

        open.total_beats += 1;
        let duration = elapsed_seconds(open.start_time);
        let total_beats = open.total_beats;

        self.store.update_open_session(SessionUpdate {
            duration_seconds: Some(duration),
            total_beats: Some(total_beats),
            average_bpm: Some(bpm),
            ..SessionUpdate::default()
        });
    }

    /// Stamp the end time and freeze the counters. No-op when nothing is open.
    pub fn close(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        self.store.update_open_session(SessionUpdate {
            end_time: Some(Utc::now()),
            duration_seconds: Some(elapsed_seconds(open.start_time)),
            total_beats: Some(open.total_beats),
            ..SessionUpdate::default()
        });
    }

    /// Zero the visible timer and beat counter without touching the stored
    /// session record (manual "reset" action, distinct from stop)
    pub fn reset_display(&mut self) {
        self.display_start = Utc::now();
        self.display_beat_offset = self.open.as_ref().map_or(0, |o| o.total_beats);
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Beats shown to the user since the last display reset
    pub fn display_beats(&self) -> u64 {
        self.open
            .as_ref()
            .map_or(0, |o| o.total_beats.saturating_sub(self.display_beat_offset))
    }

    /// Seconds shown to the user since the last display reset
    pub fn display_seconds(&self) -> u32 {
        elapsed_seconds(self.display_start)
    }
}

fn elapsed_seconds(since: DateTime<Utc>) -> u32 {
    (Utc::now() - since).num_seconds().max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tracker() -> (tempfile::TempDir, SessionTracker, Arc<MetronomeStore>) {
        let dir = tempdir().unwrap();
        let store = Arc::new(MetronomeStore::with_dir(dir.path()));
        let tracker = SessionTracker::new(Arc::clone(&store));
        (dir, tracker, store)
    }

    #[test]
    fn test_open_tick_close_lifecycle() {
        let (_dir, mut tracker, store) = tracker();

        tracker.open(120);
        assert!(tracker.is_open());
        let open = store.open_session().unwrap();
        assert_eq!(open.total_beats, 0);
        assert_eq!(open.average_bpm, 120);

        tracker.on_tick(120);
        tracker.on_tick(120);
        tracker.on_tick(132);
        let open = store.open_session().unwrap();
        assert_eq!(open.total_beats, 3);
        assert_eq!(open.average_bpm, 132);

        tracker.close();
        assert!(!tracker.is_open());
        assert!(store.open_session().is_none());
        let closed = &store.list_sessions()[0];
        assert!(closed.end_time.is_some());
        assert_eq!(closed.total_beats, 3);
    }

    #[test]
    fn test_open_twice_keeps_one_session() {
        let (_dir, mut tracker, store) = tracker();
        tracker.open(120);
        tracker.open(160);
        assert_eq!(store.list_sessions().len(), 1);
        assert_eq!(store.open_session().unwrap().average_bpm, 120);
    }

    #[test]
    fn test_reattaches_to_existing_open_record() {
        let (_dir, mut tracker, store) = tracker();
        tracker.open(120);
        tracker.on_tick(120);
        tracker.on_tick(120);

        // A fresh tracker (new process) finds the same open record
        let mut second = SessionTracker::new(Arc::clone(&store));
        second.open(100);
        assert_eq!(store.list_sessions().len(), 1);

        second.on_tick(100);
        assert_eq!(store.open_session().unwrap().total_beats, 3);
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let (_dir, mut tracker, store) = tracker();
        tracker.close();
        assert!(store.list_sessions().is_empty());
    }

    #[test]
    fn test_tick_without_open_is_noop() {
        let (_dir, mut tracker, store) = tracker();
        tracker.on_tick(120);
        assert!(store.list_sessions().is_empty());
    }

    #[test]
    fn test_reset_display_keeps_stored_record() {
        let (_dir, mut tracker, store) = tracker();
        tracker.open(120);
        tracker.on_tick(120);
        tracker.on_tick(120);
        assert_eq!(tracker.display_beats(), 2);

        tracker.reset_display();
        assert_eq!(tracker.display_beats(), 0);
        // The stored session still counts every beat
        assert_eq!(store.open_session().unwrap().total_beats, 2);

        tracker.on_tick(120);
        assert_eq!(tracker.display_beats(), 1);
        assert_eq!(store.open_session().unwrap().total_beats, 3);
    }
}
