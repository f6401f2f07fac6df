//! Chunk accumulation between flush events.
//!
//! Incoming frames carry paired raw/mono byte buffers. With a threshold
//! configured, frames accumulate until the mono buffer grows to the
//! threshold and the aggregate flushes as one chunk; without one, every
//! frame passes straight through.

use crate::models::audio::AudioChunk;

/// Error type a chunk sink may return to halt recording.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-supplied sink receiving flushed audio chunks.
///
/// Returning an `Err` is treated as a stop-recording signal, not a fatal
/// pipeline failure.
pub type ChunkSink = Box<dyn FnMut(AudioChunk) -> Result<(), SinkError> + Send>;

/// Byte-wise concatenation of two buffers into a new contiguous buffer.
pub fn merge_buffers(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    merged
}

/// Accumulates raw and mono byte buffers in lock-step until the configured
/// mono-length threshold is reached.
#[derive(Debug, Default)]
pub struct ChunkAggregator {
    raw: Vec<u8>,
    mono: Vec<u8>,
    threshold: Option<usize>,
}

impl ChunkAggregator {
    pub fn new(threshold: Option<usize>) -> Self {
        Self {
            raw: Vec::new(),
            mono: Vec::new(),
            threshold,
        }
    }

    /// Drop any buffered bytes and install a new threshold. Called when a
    /// recording segment starts.
    pub fn reset(&mut self, threshold: Option<usize>) {
        self.raw.clear();
        self.mono.clear();
        self.threshold = threshold;
    }

    /// Absorb one incoming frame.
    ///
    /// Returns a chunk to deliver when the threshold is met (the aggregate,
    /// including any excess beyond the threshold from this frame) or, with
    /// no threshold configured, the frame itself. Returns `None` while still
    /// accumulating.
    pub fn push(&mut self, frame: AudioChunk) -> Option<AudioChunk> {
        let Some(threshold) = self.threshold else {
            return Some(frame);
        };

        self.raw = merge_buffers(&self.raw, &frame.raw);
        self.mono = merge_buffers(&self.mono, &frame.mono);

        if self.mono.len() >= threshold {
            Some(AudioChunk {
                raw: std::mem::take(&mut self.raw),
                mono: std::mem::take(&mut self.mono),
            })
        } else {
            None
        }
    }

    /// Take whatever is buffered, if anything. Used for the final flush on
    /// pause/end.
    pub fn take_partial(&mut self) -> Option<AudioChunk> {
        if self.raw.is_empty() && self.mono.is_empty() {
            return None;
        }
        Some(AudioChunk {
            raw: std::mem::take(&mut self.raw),
            mono: std::mem::take(&mut self.mono),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.mono.is_empty()
    }
}
