// Beatkeeper - Library exports for the binary and integration tests

pub mod engine;
pub mod render;
pub mod session;
pub mod storage;
pub mod tempo;

// Re-export commonly used types for convenience
pub use engine::{BeatScheduler, MetronomeState, Settings, SharedState, SoundType, VisualType};
pub use render::{CpalToneRenderer, HapticDevice, NoopHaptics, NullToneRenderer, ToneRenderer};
pub use session::SessionTracker;
pub use storage::{MetronomeStore, Preset, Session};
pub use tempo::{MAX_BPM, MIN_BPM, TapTempo, clamp_bpm, interval_millis};
