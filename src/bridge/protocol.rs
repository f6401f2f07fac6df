//! Message types exchanged with the audio worklet.
//!
//! Requests follow the `{event, id}` schema; replies are tagged either as a
//! `receipt` fulfilling a pending request by id, or a `chunk` carrying an
//! unsolicited streamed audio frame.

use serde::{Deserialize, Serialize};

use crate::models::audio::{AudioChunk, ReadResult};

/// Control operations understood by the worklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Start converting and streaming frames.
    Start,
    /// Stop streaming; accumulated audio is retained.
    Stop,
    /// Snapshot the accumulated audio without stopping.
    Read,
    /// Discard the accumulated audio.
    Clear,
}

impl RequestKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Read => "read",
            Self::Clear => "clear",
        }
    }
}

/// Outbound request to the worklet, tagged with its correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkletRequest {
    pub event: RequestKind,
    pub id: u64,
}

/// Payload of a fulfilled receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptPayload {
    /// Bare acknowledgement (start/stop/clear).
    Ack,
    /// Accumulated audio snapshot (read).
    Audio(ReadResult),
}

/// Inbound message from the worklet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkletReply {
    Receipt { id: u64, data: ReceiptPayload },
    Chunk { data: AudioChunk },
}
