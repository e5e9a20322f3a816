// Beat engine - shared playback state, effect dispatch, and scheduling

pub mod dispatch;
pub mod scheduler;
pub mod state;

pub use dispatch::{BeatDispatcher, vibration_duration_ms};
pub use scheduler::BeatScheduler;
pub use state::{
    BEATS_PER_CYCLE, MetronomeState, Settings, SharedState, SoundType, VisualType, shared_state,
};
