// Tempo model - BPM validation and interval conversion
// Pure data, no side effects: out-of-range input is coerced, never rejected

/// Slowest supported tempo
pub const MIN_BPM: u16 = 40;

/// Fastest supported tempo
pub const MAX_BPM: u16 = 200;

/// Clamp an arbitrary BPM value into the supported range [40, 200]
pub fn clamp_bpm(bpm: i64) -> u16 {
    bpm.clamp(MIN_BPM as i64, MAX_BPM as i64) as u16
}

/// Duration of one beat in milliseconds at the given tempo
pub fn interval_millis(bpm: u16) -> f64 {
    60_000.0 / bpm as f64
}
