// Rendering collaborators - tone synthesis, audio output, haptics

pub mod haptic;
pub mod output;
pub mod tone;

pub use haptic::{HapticDevice, NoopHaptics};
pub use output::{AudioError, CpalToneRenderer};
pub use tone::{ClickBank, NullToneRenderer, ToneRenderer};
