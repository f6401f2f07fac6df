//! # voice-capture-core
//!
//! Microphone capture engine: records a live device stream as PCM16 audio,
//! streaming chunked raw/mono buffers to a caller-supplied sink.
//!
//! Platform backends implement the [`MediaProvider`] trait and plug into the
//! generic [`WavRecorder`] session; the audio worklet runs isolated on its
//! own thread and is reached only through correlated message passing.
//!
//! ## Architecture
//!
//! ```text
//! voice-capture-core (this crate)
//! ├── traits/       ← MediaProvider, MediaStream, RecorderDelegate
//! ├── models/       ← CaptureError, RecorderStatus, RecorderConfig, audio types
//! ├── bridge/       ← worklet protocol, receipt correlation, pump thread
//! ├── processing/   ← chunk aggregation, PCM math, WAV pack/parse, decoder
//! └── session/      ← WavRecorder (begin/pause/record/read/end)
//! ```

pub mod bridge;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio::{
    AudioBlob, AudioBuffer, AudioChunk, DecodedAudio, PermissionState, ReadResult,
    StreamConstraints,
};
pub use models::config::{RecorderConfig, DEFAULT_CHUNK_THRESHOLD};
pub use models::error::CaptureError;
pub use models::state::{RecorderStatus, StopReason};
pub use processing::chunker::{merge_buffers, ChunkAggregator, ChunkSink, SinkError};
pub use processing::decoder::{decode, AudioInput, MIN_SOURCE_SAMPLE_RATE};
pub use processing::wav::{generate_header, pack, parse, WavAudio, WAV_HEADER_SIZE};
pub use session::recorder::WavRecorder;
pub use traits::media_provider::{MediaProvider, MediaStream, SampleCallback};
pub use traits::recorder_delegate::RecorderDelegate;
