//! Session-side end of the worklet bridge: correlated request dispatch and
//! the inbound message pump.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::state::StopReason;
use crate::processing::chunker::{ChunkAggregator, ChunkSink};
use crate::traits::recorder_delegate::RecorderDelegate;

use super::protocol::{ReceiptPayload, RequestKind, WorkletReply, WorkletRequest};
use super::receipts::ReceiptTable;
use super::worklet::WorkletInput;

/// State of the current recording segment, shared between the session and
/// the pump thread.
#[derive(Default)]
pub(crate) struct Segment {
    pub aggregator: ChunkAggregator,
    pub sink: Option<ChunkSink>,
}

impl Segment {
    pub fn clear(&mut self) {
        self.aggregator.reset(None);
        self.sink = None;
    }
}

/// Handle for dispatching correlated requests to the worklet.
///
/// Dropping the handle posts `Close` to the inbox, which shuts the worklet
/// thread down even if the device stream still holds an inbox sender.
pub(crate) struct WorkletHandle {
    inbox: Sender<WorkletInput>,
    receipts: Arc<ReceiptTable>,
    next_id: AtomicU64,
    event_timeout: Duration,
    poll_interval: Duration,
}

impl WorkletHandle {
    pub fn new(
        inbox: Sender<WorkletInput>,
        receipts: Arc<ReceiptTable>,
        event_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            inbox,
            receipts,
            next_id: AtomicU64::new(0),
            event_timeout,
            poll_interval,
        }
    }

    /// Send a request and wait for its correlated receipt.
    ///
    /// Ids increase monotonically and are never recycled within a session.
    /// The wait polls the receipt table at `poll_interval` until the receipt
    /// arrives or `event_timeout` elapses; on timeout the pending entry is
    /// removed so a late receipt cannot linger.
    pub fn dispatch(&self, kind: RequestKind) -> Result<ReceiptPayload, CaptureError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let timeout_error = || CaptureError::RequestTimeout {
            event: kind.name().to_string(),
        };

        self.inbox
            .send(WorkletInput::Request(WorkletRequest { event: kind, id }))
            .map_err(|_| timeout_error())?;

        let sent_at = Instant::now();
        loop {
            if let Some(payload) = self.receipts.take(id) {
                return Ok(payload);
            }
            if sent_at.elapsed() >= self.event_timeout {
                self.receipts.discard(id);
                return Err(timeout_error());
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl Drop for WorkletHandle {
    fn drop(&mut self) {
        let _ = self.inbox.send(WorkletInput::Close);
    }
}

/// Spawn the pump thread that drains worklet replies.
///
/// Receipts go to the correlation table. Chunks are dropped unless the
/// recording flag is set — the flag flip at pause is a hard boundary, so no
/// post-pause frame can leak into the next segment. A sink error is caught,
/// logged, and turned into an implicit stop-recording signal.
pub(crate) fn spawn_pump(
    replies: Receiver<WorkletReply>,
    receipts: Arc<ReceiptTable>,
    recording: Arc<AtomicBool>,
    segment: Arc<Mutex<Segment>>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("worklet-pump".into()).spawn(move || {
        while let Ok(reply) = replies.recv() {
            match reply {
                WorkletReply::Receipt { id, data } => receipts.fulfill(id, data),
                WorkletReply::Chunk { data } => {
                    if !recording.load(Ordering::SeqCst) {
                        continue;
                    }
                    let mut guard = segment.lock();
                    let Some(chunk) = guard.aggregator.push(data) else {
                        continue;
                    };
                    let Some(sink) = guard.sink.as_mut() else {
                        continue;
                    };
                    if let Err(err) = sink(chunk) {
                        log::warn!("error in chunk sink, stopping recording: {err}");
                        recording.store(false, Ordering::SeqCst);
                        if let Some(delegate) = &delegate {
                            delegate.on_recording_stopped(StopReason::SinkError);
                        }
                    }
                }
            }
        }
        log::debug!("worklet pump shut down");
    })
}
