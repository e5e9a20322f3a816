// Tone rendering - short percussive click synthesis
// Clicks are pre-generated per timbre so the audio callback only copies samples

use std::f32::consts::PI;

use crate::engine::state::SoundType;

/// Renders a short percussive sound on demand.
///
/// Fire-and-forget: implementations swallow and log their own failures,
/// a beat that produces no sound must never stall the beat cycle.
pub trait ToneRenderer: Send + Sync {
    /// Play `sound` at `volume` (0-100)
    fn play(&self, sound: SoundType, volume: u8);
}

/// Silent renderer for headless operation and tests
#[derive(Debug, Default)]
pub struct NullToneRenderer;

impl ToneRenderer for NullToneRenderer {
    fn play(&self, _sound: SoundType, _volume: u8) {}
}

/// Synthesis recipe for one timbre
struct ClickSpec {
    waveform: Waveform,
    /// Oscillator frequency at onset (Hz)
    freq_start: f32,
    /// Frequency at the end of the click; differs from `freq_start` only
    /// for the cowbell's downward sweep
    freq_end: f32,
    /// Click length in seconds
    duration: f32,
    /// Peak envelope amplitude
    amplitude: f32,
}

#[derive(Clone, Copy)]
enum Waveform {
    Sine,
    Square,
    Triangle,
}

impl ClickSpec {
    fn for_sound(sound: SoundType) -> Self {
        match sound {
            SoundType::Click => Self {
                waveform: Waveform::Square,
                freq_start: 1000.0,
                freq_end: 1000.0,
                duration: 0.1,
                amplitude: 0.3,
            },
            SoundType::Beep => Self {
                waveform: Waveform::Sine,
                freq_start: 800.0,
                freq_end: 800.0,
                duration: 0.2,
                amplitude: 0.3,
            },
            SoundType::Wood => Self {
                waveform: Waveform::Square,
                freq_start: 2000.0,
                freq_end: 2000.0,
                duration: 0.05,
                amplitude: 0.5,
            },
            SoundType::Cowbell => Self {
                waveform: Waveform::Triangle,
                freq_start: 800.0,
                freq_end: 200.0,
                duration: 0.3,
                amplitude: 0.4,
            },
            SoundType::Tick => Self {
                waveform: Waveform::Sine,
                freq_start: 1200.0,
                freq_end: 1200.0,
                duration: 0.1,
                amplitude: 0.2,
            },
        }
    }
}

/// Pre-generated click buffers, one per timbre.
///
/// Generating at construction keeps the real-time path allocation-free:
/// playback is a buffer copy plus a gain multiply.
#[derive(Debug, Clone)]
pub struct ClickBank {
    buffers: [Vec<f32>; SoundType::ALL.len()],
}

impl ClickBank {
    pub fn new(sample_rate: f32) -> Self {
        let buffers = SoundType::ALL.map(|sound| generate_click(sample_rate, sound));
        Self { buffers }
    }

    /// Samples for the given timbre
    pub fn click(&self, sound: SoundType) -> &[f32] {
        let index = SoundType::ALL
            .iter()
            .position(|&s| s == sound)
            .unwrap_or(0);
        &self.buffers[index]
    }

    /// Length in samples of the longest click
    pub fn max_click_len(&self) -> usize {
        self.buffers.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Generate one click buffer: oscillator with exponential-decay envelope,
/// frequency optionally sweeping from start to end over the duration.
fn generate_click(sample_rate: f32, sound: SoundType) -> Vec<f32> {
    let spec = ClickSpec::for_sound(sound);
    let num_samples = (spec.duration * sample_rate) as usize;
    let mut samples = Vec::with_capacity(num_samples);

    // Decay to 1% of peak over the click duration
    let decay_rate = (0.01f32).ln().abs();
    let mut phase = 0.0f32;

    for i in 0..num_samples {
        let t = i as f32 / num_samples as f32;
        let envelope = (-t * decay_rate).exp();

        // Exponential frequency ramp (perceptually linear sweep)
        let freq = spec.freq_start * (spec.freq_end / spec.freq_start).powf(t);
        phase += 2.0 * PI * freq / sample_rate;

        let raw = match spec.waveform {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                // Triangle from phase position within the cycle
                let cycle = (phase / (2.0 * PI)).fract();
                4.0 * (cycle - 0.5).abs() - 1.0
            }
        };

        samples.push(raw * envelope * spec.amplitude);
    }

    samples
}

/// Convert a 0-100 UI volume to a linear gain
pub fn volume_to_gain(volume: u8) -> f32 {
    (volume.min(100) as f32) / 100.0
}
