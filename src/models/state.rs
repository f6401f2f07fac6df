use serde::{Deserialize, Serialize};

/// Recorder status, derived from the session handles rather than stored.
///
/// ```text
/// ended ──begin──▶ paused ◀──pause── recording
///   ▲                │  └──record──────▶ ▲
///   └──────end───────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderStatus {
    Ended,
    Paused,
    Recording,
}

impl RecorderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ended => "ended",
            Self::Paused => "paused",
            Self::Recording => "recording",
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

/// Why frame delivery to the sink stopped.
///
/// `SinkError` distinguishes the implicit stop caused by a failing sink from
/// an ordinary `pause()`, so callers polling status can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Paused,
    SessionEnded,
    SinkError,
}
