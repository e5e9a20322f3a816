// Haptic feedback - best-effort vibration requests

/// Asks the device to vibrate for a duration.
///
/// Best-effort: absence of hardware support is a silent no-op, never an error.
pub trait HapticDevice: Send + Sync {
    fn vibrate(&self, duration_ms: u32);
}

/// No-hardware implementation
#[derive(Debug, Default)]
pub struct NoopHaptics;

impl HapticDevice for NoopHaptics {
    fn vibrate(&self, _duration_ms: u32) {}
}
