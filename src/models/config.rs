use std::time::Duration;

/// Default mono byte length at which accumulated frames flush to the sink.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 8192;

/// Configuration for a recorder session.
///
/// The sample rate is fixed for the lifetime of a session; change it only
/// between `end()` and the next `begin()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Session sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Route captured audio back out to the speakers while recording.
    pub output_to_speakers: bool,

    /// How long a worklet request may wait for its receipt (default: 5 s).
    pub event_timeout: Duration,

    /// Interval between receipt-table polls while waiting (default: 1 ms).
    pub receipt_poll_interval: Duration,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.event_timeout.is_zero() {
            return Err("event timeout must be non-zero".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            output_to_speakers: false,
            event_timeout: Duration::from_secs(5),
            receipt_poll_interval: Duration::from_millis(1),
        }
    }
}
