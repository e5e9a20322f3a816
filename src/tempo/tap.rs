// Tap tempo - derives BPM from the timing between user tap events

use super::model::clamp_bpm;

/// Maximum number of taps kept for the estimate
const MAX_TAPS: usize = 4;

/// Taps further apart than this start a fresh estimate
const IDLE_CLEAR_MS: u64 = 3000;

/// Accumulates recent tap timestamps and estimates a tempo from the
/// mean inter-tap interval.
///
/// The buffer holds at most the last 4 taps. A gap of 3 seconds or more
/// since the previous tap discards the old taps, so a stale half-finished
/// tap run never skews a new one.
#[derive(Debug, Default)]
pub struct TapTempo {
    taps: Vec<u64>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self {
            taps: Vec::with_capacity(MAX_TAPS + 1),
        }
    }

    /// Record a tap at `now_ms` (milliseconds on any monotonic scale).
    ///
    /// Returns the clamped BPM estimate once at least two taps are buffered.
    /// A single tap, or taps whose intervals are all zero, yield `None` and
    /// leave the current tempo untouched.
    pub fn record_tap(&mut self, now_ms: u64) -> Option<u16> {
        if let Some(&last) = self.taps.last() {
            if now_ms.saturating_sub(last) >= IDLE_CLEAR_MS {
                self.taps.clear();
            }
        }

        self.taps.push(now_ms);
        if self.taps.len() > MAX_TAPS {
            self.taps.remove(0);
        }

        if self.taps.len() < 2 {
            return None;
        }

        // Zero-length intervals (double-fired taps) are excluded from the
        // mean so they cannot divide by zero or drag the estimate to 200.
        let intervals: Vec<u64> = self
            .taps
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]))
            .filter(|&d| d > 0)
            .collect();

        if intervals.is_empty() {
            return None;
        }

        let mean = intervals.iter().sum::<u64>() as f64 / intervals.len() as f64;
        Some(clamp_bpm((60_000.0 / mean).round() as i64))
    }

    /// Number of buffered taps
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Discard all buffered taps
    pub fn clear(&mut self) {
        self.taps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tap_no_estimate() {
        let mut tap = TapTempo::new();
        assert_eq!(tap.record_tap(1000), None);
        assert_eq!(tap.len(), 1);
    }

    #[test]
    fn test_steady_taps_at_120_bpm() {
        let mut tap = TapTempo::new();
        assert_eq!(tap.record_tap(0), None);
        assert_eq!(tap.record_tap(500), Some(120));
        assert_eq!(tap.record_tap(1000), Some(120));
        assert_eq!(tap.record_tap(1500), Some(120));
    }

    #[test]
    fn test_estimate_is_mean_of_intervals() {
        let mut tap = TapTempo::new();
        tap.record_tap(0);
        tap.record_tap(400);
        // Intervals 400 and 600 -> mean 500 -> 120 BPM
        assert_eq!(tap.record_tap(1000), Some(120));
    }

    #[test]
    fn test_buffer_keeps_last_four_taps() {
        let mut tap = TapTempo::new();
        // Slow taps first (1000ms apart = 60 BPM)
        for t in [0u64, 1000, 2000, 3000] {
            tap.record_tap(t);
        }
        assert_eq!(tap.len(), 4);
        // Faster taps push the slow ones out of the window
        tap.record_tap(3500);
        tap.record_tap(4000);
        let estimate = tap.record_tap(4500).unwrap();
        assert_eq!(tap.len(), 4);
        // Window is now [3000, 3500, 4000, 4500]: all 500ms intervals
        assert_eq!(estimate, 120);
    }

    #[test]
    fn test_identical_timestamps_are_guarded() {
        let mut tap = TapTempo::new();
        assert_eq!(tap.record_tap(1000), None);
        // Same timestamp twice: no interval to measure, no estimate, no panic
        assert_eq!(tap.record_tap(1000), None);
        // A real interval afterwards still produces a sane estimate
        assert_eq!(tap.record_tap(1500), Some(120));
    }

    #[test]
    fn test_idle_gap_starts_fresh() {
        let mut tap = TapTempo::new();
        tap.record_tap(0);
        tap.record_tap(500);
        assert_eq!(tap.len(), 2);
        // 3 seconds of silence clears the buffer before the new tap lands
        assert_eq!(tap.record_tap(3500), None);
        assert_eq!(tap.len(), 1);
        assert_eq!(tap.record_tap(4500), Some(60));
    }

    #[test]
    fn test_estimate_clamped_to_range() {
        let mut tap = TapTempo::new();
        tap.record_tap(0);
        // 100ms interval = 600 BPM raw, clamped to 200
        assert_eq!(tap.record_tap(100), Some(200));

        let mut slow = TapTempo::new();
        slow.record_tap(0);
        // 2900ms interval (just under the idle cutoff) = ~21 BPM raw
        assert_eq!(slow.record_tap(2900), Some(40));
    }

    #[test]
    fn test_clear() {
        let mut tap = TapTempo::new();
        tap.record_tap(0);
        tap.record_tap(500);
        tap.clear();
        assert!(tap.is_empty());
        assert_eq!(tap.record_tap(600), None);
    }
}
