// Audio output - CPAL real-time callback playing pre-generated clicks
//
// The cpal Stream is not Send on every backend (CoreAudio in particular), so
// the stream lives on a dedicated audio thread for the life of the process.
// The renderer itself only holds the lock-free producer side of the click
// queue, which makes it freely shareable with the scheduler's timer thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use super::tone::{ClickBank, ToneRenderer, volume_to_gain};
use crate::engine::state::SoundType;

// A beat enqueues one click; even at 200 BPM a handful of slots is plenty,
// and a full queue just drops the click (fire-and-forget).
const CLICK_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("device configuration error: {0}")]
    Config(String),

    #[error("failed to build output stream: {0}")]
    Stream(String),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error("audio thread failed to start: {0}")]
    Thread(String),
}

/// One queued click: which timbre, at what linear gain
struct ClickRequest {
    sound: SoundType,
    gain: f32,
}

/// Click currently being mixed into the output
struct ActiveClick {
    sound: SoundType,
    gain: f32,
    position: usize,
}

/// Tone renderer backed by the default cpal output device.
pub struct CpalToneRenderer {
    tx: Mutex<HeapProd<ClickRequest>>,
    sample_rate: f32,
}

impl CpalToneRenderer {
    /// Open the default output device and start the stream.
    ///
    /// Fails when no device is available or the stream cannot be built;
    /// callers degrade to [`super::tone::NullToneRenderer`] in that case.
    pub fn new() -> Result<Self, AudioError> {
        let rb = HeapRb::<ClickRequest>::new(CLICK_QUEUE_CAPACITY);
        let (tx, rx) = rb.split();

        let (result_tx, result_rx) = mpsc::channel();

        thread::Builder::new()
            .name("beatkeeper-audio".to_string())
            .spawn(move || match open_output_stream(rx) {
                Ok((stream, sample_rate)) => {
                    let _ = result_tx.send(Ok(sample_rate));
                    // The stream plays for as long as this handle lives.
                    let _stream = stream;
                    loop {
                        thread::park();
                    }
                }
                Err(e) => {
                    let _ = result_tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::Thread(e.to_string()))?;

        let sample_rate = result_rx
            .recv()
            .map_err(|_| AudioError::Thread("audio thread exited".to_string()))??;

        log::info!("audio output ready at {} Hz", sample_rate);

        Ok(Self {
            tx: Mutex::new(tx),
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl ToneRenderer for CpalToneRenderer {
    fn play(&self, sound: SoundType, volume: u8) {
        let request = ClickRequest {
            sound,
            gain: volume_to_gain(volume),
        };
        match self.tx.lock() {
            Ok(mut tx) => {
                if tx.try_push(request).is_err() {
                    log::warn!("click queue full, dropping {} click", sound.name());
                }
            }
            Err(_) => log::error!("click queue lock poisoned, dropping click"),
        }
    }
}

/// Build and start the output stream for the device's preferred sample format.
fn open_output_stream(rx: HeapCons<ClickRequest>) -> Result<(Stream, f32), AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::Config(e.to_string()))?;

    let sample_format = supported.sample_format();
    let sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;
    let config: StreamConfig = supported.into();

    let bank = ClickBank::new(sample_rate);

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, bank, rx),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, bank, rx),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, bank, rx),
        other => return Err(AudioError::UnsupportedFormat(other)),
    }?;

    stream.play().map_err(|e| AudioError::Stream(e.to_string()))?;

    Ok((stream, sample_rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    bank: ClickBank,
    mut rx: HeapCons<ClickRequest>,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut active: Option<ActiveClick> = None;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, no I/O, no blocking locks in here.

                // Newest request wins; a retriggered click restarts from the top
                while let Some(request) = rx.try_pop() {
                    active = Some(ActiveClick {
                        sound: request.sound,
                        gain: request.gain,
                        position: 0,
                    });
                }

                for frame in data.chunks_mut(channels) {
                    let mut value = 0.0f32;

                    if let Some(click) = active.as_mut() {
                        let samples = bank.click(click.sound);
                        if click.position < samples.len() {
                            value = samples[click.position] * click.gain;
                            click.position += 1;
                        } else {
                            active = None;
                        }
                    }

                    let converted = T::from_sample(value);
                    for out in frame.iter_mut() {
                        *out = converted;
                    }
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))
}
