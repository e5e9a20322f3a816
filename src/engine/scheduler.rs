// Beat scheduler - owns the repeating trigger that drives the beat cycle
//
// Two states: Stopped and Running. A Running scheduler has one live timer
// thread; the epoch counter implements cancel-then-replace. Every control
// operation bumps the epoch under the state lock, and a waking timer thread
// re-checks its epoch under that same lock before dispatching, so a tick that
// raced a cancellation can never fire. Ticks are strictly serialized: the
// timer thread dispatches under the lock, one beat at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::dispatch::BeatDispatcher;
use crate::engine::state::{MetronomeState, Settings, SharedState, shared_state};
use crate::render::{HapticDevice, ToneRenderer};
use crate::session::SessionTracker;
use crate::storage::MetronomeStore;
use crate::tempo::{TapTempo, clamp_bpm, interval_millis};

pub struct BeatScheduler {
    state: SharedState,
    dispatcher: Arc<BeatDispatcher>,
    tracker: Arc<Mutex<SessionTracker>>,
    store: Arc<MetronomeStore>,
    tap: Mutex<TapTempo>,
    /// Incremented on every cancel/retarget; a timer thread only ticks
    /// while its captured epoch is still current
    epoch: Arc<AtomicU64>,
    /// Monotonic reference for tap timestamps
    clock: Instant,
}

impl BeatScheduler {
    /// Build a scheduler over the stored settings and the given collaborators
    pub fn new(
        store: Arc<MetronomeStore>,
        tone: Arc<dyn ToneRenderer>,
        haptics: Arc<dyn HapticDevice>,
    ) -> Self {
        let settings = store.load_settings();
        Self {
            state: shared_state(settings),
            dispatcher: Arc::new(BeatDispatcher::new(tone, haptics)),
            tracker: Arc::new(Mutex::new(SessionTracker::new(Arc::clone(&store)))),
            store,
            tap: Mutex::new(TapTempo::new()),
            epoch: Arc::new(AtomicU64::new(0)),
            clock: Instant::now(),
        }
    }

    /// Snapshot of the current playback state
    pub fn state(&self) -> MetronomeState {
        self.state.lock().unwrap().clone()
    }

    /// The shared state instance the UI observes
    pub fn shared_state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    pub fn tracker(&self) -> Arc<Mutex<SessionTracker>> {
        Arc::clone(&self.tracker)
    }

    /// Begin playback. No-op while already running.
    ///
    /// Opens a session if none is open, fires one beat synchronously so the
    /// first click does not wait a full interval (beat 1 of the cycle, or the
    /// held beat when resuming from pause), then arms the repeating trigger.
    /// Only subsequent timer ticks advance the cycle position.
    pub fn start(&self) {
        let mut state = self.state.lock().unwrap();
        if state.is_playing {
            return;
        }

        state.is_playing = true;
        let bpm = state.settings.bpm;
        self.tracker.lock().unwrap().open(bpm);

        self.dispatcher.fire_effects(&state);
        self.tracker.lock().unwrap().on_tick(bpm);

        self.arm(beat_interval(bpm));
        log::info!("started at {} BPM", bpm);
    }

    /// Hard stop: cancel the trigger, reset the beat cycle, close the session.
    /// Safe to call from any state (a stop while paused still closes the
    /// session that pause left open).
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            // Cancel first; a queued tick that fires after this cannot dispatch
            self.epoch.fetch_add(1, Ordering::SeqCst);
            state.is_playing = false;
            state.current_beat = 1;
        }
        self.tracker.lock().unwrap().close();
        log::info!("stopped");
    }

    /// Soft pause: cancel the trigger but keep the beat-cycle position and
    /// leave the practice session open for a brief interruption.
    pub fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.is_playing {
            return;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        state.is_playing = false;
        log::info!("paused");
    }

    /// Clamp and apply a new tempo. While running, the old trigger is
    /// cancelled and a fresh full interval begins at the new tempo; no beat
    /// fires immediately and the beat-cycle position is kept.
    pub fn set_bpm(&self, bpm: i64) -> u16 {
        let clamped = clamp_bpm(bpm);
        let settings = {
            let mut state = self.state.lock().unwrap();
            state.settings.bpm = clamped;
            if state.is_playing {
                self.arm(beat_interval(clamped));
            }
            state.settings.clone()
        };
        self.store.save_settings(&settings);
        clamped
    }

    /// Record a tap now; a derived estimate retargets the tempo immediately
    pub fn tap(&self) -> Option<u16> {
        let now_ms = self.clock.elapsed().as_millis() as u64;
        self.record_tap(now_ms)
    }

    /// Tap with an explicit timestamp (milliseconds on a monotonic scale)
    pub fn record_tap(&self, now_ms: u64) -> Option<u16> {
        let estimate = self.tap.lock().unwrap().record_tap(now_ms)?;
        Some(self.set_bpm(estimate as i64))
    }

    /// Swap in a full settings block (preset load). A running scheduler is
    /// retargeted to the new tempo the same way `set_bpm` retargets it.
    pub fn apply_settings(&self, settings: Settings) {
        let settings = settings.sanitized();
        {
            let mut state = self.state.lock().unwrap();
            state.settings = settings.clone();
            if state.is_playing {
                self.arm(beat_interval(settings.bpm));
            }
        }
        self.store.save_settings(&settings);
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Settings {
        self.state.lock().unwrap().settings.clone()
    }

    /// Play the configured click once without starting playback
    pub fn preview_sound(&self) {
        let settings = self.settings();
        self.dispatcher
            .preview_tone(settings.sound_type, settings.volume);
    }

    /// Fire one haptic pulse without starting playback
    pub fn preview_vibration(&self) {
        let settings = self.settings();
        self.dispatcher
            .preview_vibration(settings.vibration_intensity);
    }

    /// Zero the visible session timer/counter (stored record untouched)
    pub fn reset_display(&self) {
        self.tracker.lock().unwrap().reset_display();
    }

    /// Replace the live timer: bump the epoch (cancelling any armed trigger)
    /// and spawn a new one. Callers hold the state lock, which makes the
    /// cancel-and-replace atomic with respect to ticks. The new timer
    /// measures deadlines from now, so a retarget begins a fresh full
    /// interval at the new tempo.
    fn arm(&self, interval: Duration) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let state = Arc::clone(&self.state);
        let dispatcher = Arc::clone(&self.dispatcher);
        let tracker = Arc::clone(&self.tracker);
        let epoch_counter = Arc::clone(&self.epoch);

        let spawned = thread::Builder::new()
            .name("beatkeeper-tick".to_string())
            .spawn(move || {
                // Deadlines accumulate from a fixed origin so the time spent
                // dispatching (lock, effects, session write) never stretches
                // the period; a slow tick only eats into the next sleep.
                let mut next = Instant::now() + interval;
                loop {
                    thread::sleep(next.saturating_duration_since(Instant::now()));
                    if !tick(&state, &dispatcher, &tracker, &epoch_counter, epoch) {
                        break;
                    }
                    next += interval;
                }
            });

        if let Err(e) = spawned {
            log::error!("could not arm beat trigger: {e}");
        }
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        // Release any timer thread still sleeping on its interval
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

/// One timer-driven tick. Returns false once this trigger is stale
/// (cancelled, retargeted, or playback stopped) so the thread exits.
fn tick(
    state: &Mutex<MetronomeState>,
    dispatcher: &BeatDispatcher,
    tracker: &Mutex<SessionTracker>,
    epoch: &AtomicU64,
    expected_epoch: u64,
) -> bool {
    let mut st = state.lock().unwrap();
    if epoch.load(Ordering::SeqCst) != expected_epoch || !st.is_playing {
        return false;
    }

    dispatcher.on_beat(&mut st);
    let bpm = st.settings.bpm;
    drop(st);

    tracker.lock().unwrap().on_tick(bpm);
    true
}

fn beat_interval(bpm: u16) -> Duration {
    Duration::from_secs_f64(interval_millis(bpm) / 1000.0)
}
