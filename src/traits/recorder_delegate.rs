use crate::models::state::{RecorderStatus, StopReason};

/// Event delegate for recorder notifications.
///
/// Methods may be called from the recorder's message-pump thread, not the
/// caller's thread. Implementations should marshal to their own executor if
/// needed.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the session status changes.
    fn on_status_changed(&self, status: RecorderStatus);

    /// Called whenever frame delivery stops, with the reason.
    ///
    /// A `StopReason::SinkError` means a caller-supplied sink failed and
    /// recording was halted implicitly.
    fn on_recording_stopped(&self, reason: StopReason);

    /// Called when microphone access is blocked and the user must
    /// intervene in platform settings.
    fn on_permission_blocked(&self);
}
