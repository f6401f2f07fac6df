use std::sync::Arc;

use crate::models::audio::{PermissionState, StreamConstraints};
use crate::models::error::CaptureError;

/// Callback invoked when a buffer of microphone audio is available.
///
/// Parameters:
/// - `samples`: interleaved f32 samples at the session sample rate.
/// - `channels`: number of interleaved channels (1 = mono).
///
/// The callback fires on the backend's capture thread — keep processing
/// minimal and hand the data off.
pub type SampleCallback = Arc<dyn Fn(&[f32], u16) + Send + Sync + 'static>;

/// Interface for platform-specific microphone backends.
///
/// A backend knows whether the platform offers capture at all, what the
/// user's permission state is, and how to open a device stream under a set
/// of constraints.
pub trait MediaProvider: Send {
    /// Whether the platform offers any media-capture capability.
    fn is_available(&self) -> bool;

    /// Current microphone permission state.
    fn permission_state(&self) -> PermissionState;

    /// Acquire a microphone stream, delivering audio via `callback`.
    ///
    /// The returned stream exclusively owns the underlying device tracks
    /// until `stop_tracks` is called.
    fn open(
        &mut self,
        constraints: &StreamConstraints,
        callback: SampleCallback,
    ) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// An open device stream.
pub trait MediaStream: Send {
    /// Stop all media tracks and release the device.
    ///
    /// Idempotent: callers may invoke this more than once.
    fn stop_tracks(&mut self);
}
