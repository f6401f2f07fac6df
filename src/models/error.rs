use thiserror::Error;

/// Errors surfaced by the capture engine.
///
/// State errors (`SessionEnded`, `AlreadyConnected`, ...) are synchronous and
/// fatal to the rejected call only; a `RequestTimeout` is fatal to that
/// request but leaves the session connected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("already connected: call end() to start a new session")]
    AlreadyConnected,

    #[error("no media capture capability available")]
    NoMediaCapability,

    #[error("could not start media stream: {0}")]
    StreamAcquisitionFailed(String),

    #[error("could not load audio worklet: {0}")]
    WorkletLoadFailed(String),

    #[error("session ended: call begin() first")]
    SessionEnded,

    #[error("already paused: call record() first")]
    AlreadyPaused,

    #[error("already recording: call pause() first")]
    AlreadyRecording,

    #[error("timeout waiting for \"{event}\" event")]
    RequestTimeout { event: String },

    #[error("unexpected worklet reply for \"{event}\" event")]
    UnexpectedReply { event: String },

    #[error("cannot specify from_sample_rate when reading from an already-encoded source")]
    SampleRateConflict,

    #[error("must specify from_sample_rate when decoding raw samples")]
    MissingSourceRate,

    #[error("minimum from_sample_rate is 3000 Hz, got {rate}")]
    SampleRateTooLow { rate: u32 },

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
