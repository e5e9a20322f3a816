// Beat effect dispatch - fans one tick out to tone, haptics, and the beat counter
//
// Effects are isolated from each other: a renderer that cannot play never
// suppresses the vibration or the counter advance, and nothing here can
// interrupt the beat cycle.

use std::sync::Arc;

use crate::engine::state::{MetronomeState, SoundType};
use crate::render::{HapticDevice, ToneRenderer};

/// Haptic pulse length for a 1-5 intensity, capped at 100ms
pub fn vibration_duration_ms(intensity: u8) -> u32 {
    (intensity as u32 * 20).min(100)
}

/// Decides which side effects fire for a beat and delegates to the
/// collaborators. One instance is shared by the scheduler and its timer thread.
pub struct BeatDispatcher {
    tone: Arc<dyn ToneRenderer>,
    haptics: Arc<dyn HapticDevice>,
}

impl BeatDispatcher {
    pub fn new(tone: Arc<dyn ToneRenderer>, haptics: Arc<dyn HapticDevice>) -> Self {
        Self { tone, haptics }
    }

    /// Fire the effects for one timer tick and advance the cycle position.
    /// Invoked exactly once per tick, always under the scheduler's state lock.
    pub fn on_beat(&self, state: &mut MetronomeState) {
        self.fire_effects(state);
        // The new current_beat is the visual highlight the UI reads
        state.advance_beat();
    }

    /// Fire the effects for the current beat without moving the cycle.
    /// Used for the synchronous beat on start, which sounds the beat the
    /// cycle is already on rather than stepping past it.
    pub fn fire_effects(&self, state: &MetronomeState) {
        let settings = &state.settings;

        if settings.audio_enabled {
            self.tone.play(settings.sound_type, settings.volume);
        }

        if settings.tactile_enabled {
            self.haptics
                .vibrate(vibration_duration_ms(settings.vibration_intensity));
        }
    }

    /// Play the configured click once, outside the beat cycle ("test sound")
    pub fn preview_tone(&self, sound: SoundType, volume: u8) {
        self.tone.play(sound, volume);
    }

    /// Fire one haptic pulse outside the beat cycle ("test vibration")
    pub fn preview_vibration(&self, intensity: u8) {
        self.haptics.vibrate(vibration_duration_ms(intensity));
    }
}
