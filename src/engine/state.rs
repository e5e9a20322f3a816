// Shared playback state - the single state object every component mutates through
// the engine's public operations (no ambient globals)

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::tempo::{MAX_BPM, MIN_BPM};

/// Number of beats in one cycle (fixed 4/4 bar)
pub const BEATS_PER_CYCLE: u8 = 4;

/// Click timbre played on each beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Click,
    Beep,
    Wood,
    Cowbell,
    Tick,
}

impl Default for SoundType {
    fn default() -> Self {
        SoundType::Click
    }
}

impl SoundType {
    /// All timbres, in UI order
    pub const ALL: [SoundType; 5] = [
        SoundType::Click,
        SoundType::Beep,
        SoundType::Wood,
        SoundType::Cowbell,
        SoundType::Tick,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoundType::Click => "click",
            SoundType::Beep => "beep",
            SoundType::Wood => "wood",
            SoundType::Cowbell => "cowbell",
            SoundType::Tick => "tick",
        }
    }
}

/// Visual pulse style (consumed by the visual renderer via shared state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualType {
    Pendulum,
    Pulse,
}

impl Default for VisualType {
    fn default() -> Self {
        VisualType::Pendulum
    }
}

/// Everything the user configures; survives restarts and preset saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub bpm: u16,
    pub visual_enabled: bool,
    pub audio_enabled: bool,
    pub tactile_enabled: bool,
    pub visual_type: VisualType,
    pub sound_type: SoundType,
    /// Click volume, 0-100
    pub volume: u8,
    /// Haptic strength, 1-5
    pub vibration_intensity: u8,
    pub primary_color: String,
    pub background_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 120,
            visual_enabled: true,
            audio_enabled: true,
            tactile_enabled: false,
            visual_type: VisualType::Pendulum,
            sound_type: SoundType::Click,
            volume: 75,
            vibration_intensity: 3,
            primary_color: "#10b981".to_string(),
            background_color: "#f1f5f9".to_string(),
        }
    }
}

impl Settings {
    /// Clamp numeric fields into their documented ranges.
    /// Called at the storage boundary so an edited file cannot smuggle
    /// an out-of-range tempo or volume into the engine.
    pub fn sanitized(mut self) -> Self {
        self.bpm = self.bpm.clamp(MIN_BPM, MAX_BPM);
        self.volume = self.volume.min(100);
        self.vibration_intensity = self.vibration_intensity.clamp(1, 5);
        self
    }
}

/// Live playback state: the persisted settings plus the transient
/// playing flag and beat-cycle position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetronomeState {
    pub settings: Settings,
    pub is_playing: bool,
    /// Position in the beat cycle, 1..=4. Only a scheduler tick moves it;
    /// meaningless while stopped (reset to 1 on stop).
    pub current_beat: u8,
}

impl MetronomeState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: settings.sanitized(),
            is_playing: false,
            current_beat: 1,
        }
    }

    /// Advance the beat cycle, wrapping 4 -> 1
    pub fn advance_beat(&mut self) {
        self.current_beat = if self.current_beat >= BEATS_PER_CYCLE {
            1
        } else {
            self.current_beat + 1
        };
    }
}

impl Default for MetronomeState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// The one shared state instance, handed into each component explicitly
pub type SharedState = Arc<Mutex<MetronomeState>>;

pub fn shared_state(settings: Settings) -> SharedState {
    Arc::new(Mutex::new(MetronomeState::new(settings)))
}
