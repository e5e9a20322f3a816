// Tempo - BPM model and tap-tempo estimation

pub mod model;
pub mod tap;

pub use model::{MAX_BPM, MIN_BPM, clamp_bpm, interval_millis};
pub use tap::TapTempo;
