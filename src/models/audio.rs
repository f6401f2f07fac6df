use serde::{Deserialize, Serialize};

/// One unit of captured audio: paired little-endian 16-bit PCM byte buffers.
///
/// `raw` carries every channel interleaved; `mono` carries the channel
/// average. Both grow in lock-step when frames are aggregated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioChunk {
    pub raw: Vec<u8>,
    pub mono: Vec<u8>,
}

impl AudioChunk {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.mono.is_empty()
    }
}

/// Snapshot of everything the worklet has accumulated this session.
///
/// `mean_values` is the per-index average across channels; `channels` holds
/// each channel's full f32 history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    pub mean_values: Vec<f32>,
    pub channels: Vec<Vec<f32>>,
}

/// An encoded audio container held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioBlob {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: "audio/wav".into(),
        }
    }
}

/// Decoded multi-channel audio at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (length of the longest channel).
    pub fn len(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel_data(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }
}

/// Output of [`decode`](crate::processing::decoder::decode): the container
/// blob, a dereferenceable handle to it, the first channel's samples, and
/// the full decoded buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub blob: AudioBlob,
    pub url: String,
    pub values: Vec<f32>,
    pub audio_buffer: AudioBuffer,
}

/// Constraints applied when acquiring a microphone stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Pin the stream to a specific input device, or use the default.
    pub device_id: Option<String>,
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
    pub auto_gain_control: bool,
    /// Ask the backend to monitor captured audio through the speakers.
    pub monitor: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            noise_suppression: true,
            echo_cancellation: true,
            auto_gain_control: true,
            monitor: false,
        }
    }
}

/// Platform microphone permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Undetermined: the platform has not asked the user yet.
    Prompt,
}
