//! Session orchestration: microphone lifecycle, worklet wiring, and the
//! begin/pause/record/read/end surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::unbounded;
use parking_lot::Mutex;

use crate::bridge::handle::{spawn_pump, Segment, WorkletHandle};
use crate::bridge::protocol::{ReceiptPayload, RequestKind};
use crate::bridge::receipts::ReceiptTable;
use crate::bridge::worklet::{self, SampleBuffer, WorkletInput};
use crate::models::audio::{PermissionState, ReadResult, StreamConstraints};
use crate::models::config::{RecorderConfig, DEFAULT_CHUNK_THRESHOLD};
use crate::models::error::CaptureError;
use crate::models::state::{RecorderStatus, StopReason};
use crate::processing::chunker::ChunkSink;
use crate::traits::media_provider::{MediaProvider, MediaStream, SampleCallback};
use crate::traits::recorder_delegate::RecorderDelegate;

/// Records a live microphone stream as PCM16 audio, streaming chunked
/// raw/mono buffers to a caller-supplied sink.
///
/// Generic over the platform backend via [`MediaProvider`]. One session at a
/// time: `begin` acquires the device stream and worklet, `end` releases
/// both. While a session is open the device recording indicator stays on
/// even when paused — the stream is held, audio is just not stored.
pub struct WavRecorder<P: MediaProvider> {
    provider: P,
    config: RecorderConfig,
    delegate: Option<Arc<dyn RecorderDelegate>>,

    // Session handles; both None outside begin..end.
    stream: Option<Box<dyn MediaStream>>,
    worklet: Option<WorkletHandle>,
    worklet_thread: Option<JoinHandle<()>>,
    pump_thread: Option<JoinHandle<()>>,

    // Shared with the pump thread.
    recording: Arc<AtomicBool>,
    segment: Arc<Mutex<Segment>>,
}

impl<P: MediaProvider> WavRecorder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: RecorderConfig::default(),
            delegate: None,
            stream: None,
            worklet: None,
            worklet_thread: None,
            pump_thread: None,
            recording: Arc::new(AtomicBool::new(false)),
            segment: Arc::new(Mutex::new(Segment::default())),
        }
    }

    pub fn with_config(provider: P, config: RecorderConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfig)?;
        let mut recorder = Self::new(provider);
        recorder.config = config;
        Ok(recorder)
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    /// The session sample rate, fixed at construction.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Current status, derived from the session handles. No side effects.
    pub fn get_status(&self) -> RecorderStatus {
        if self.worklet.is_none() {
            RecorderStatus::Ended
        } else if !self.recording.load(Ordering::SeqCst) {
            RecorderStatus::Paused
        } else {
            RecorderStatus::Recording
        }
    }

    /// Query microphone permission, surfacing a blocking notice if denied
    /// and probing with a transient acquire/release if undetermined (which
    /// triggers the platform prompt).
    pub fn request_permission(&mut self) -> Result<PermissionState, CaptureError> {
        let state = self.provider.permission_state();
        match state {
            PermissionState::Granted => {}
            PermissionState::Denied => self.notify_permission_blocked(),
            PermissionState::Prompt => {
                let constraints = StreamConstraints::default();
                let callback: SampleCallback = Arc::new(|_, _| {});
                match self.provider.open(&constraints, callback) {
                    Ok(mut stream) => stream.stop_tracks(),
                    Err(_) => self.notify_permission_blocked(),
                }
            }
        }
        Ok(state)
    }

    /// Begin a recording session: acquire the microphone stream and wire it
    /// through the audio worklet. Returns only once the whole pipeline is
    /// connected; status afterwards is `Paused`.
    pub fn begin(&mut self, device_id: Option<&str>) -> Result<(), CaptureError> {
        if self.worklet.is_some() {
            return Err(CaptureError::AlreadyConnected);
        }
        if !self.provider.is_available() {
            return Err(CaptureError::NoMediaCapability);
        }

        let constraints = StreamConstraints {
            device_id: device_id.map(str::to_owned),
            monitor: self.config.output_to_speakers,
            ..StreamConstraints::default()
        };

        let (inbox_tx, inbox_rx) = unbounded::<WorkletInput>();
        let sample_tx = inbox_tx.clone();
        let callback: SampleCallback = Arc::new(move |samples, channels| {
            let _ = sample_tx.send(WorkletInput::Samples(SampleBuffer {
                samples: samples.to_vec(),
                channels,
            }));
        });

        let mut stream = self
            .provider
            .open(&constraints, callback)
            .map_err(|err| CaptureError::StreamAcquisitionFailed(err.to_string()))?;

        let (reply_tx, reply_rx) = unbounded();

        let worklet_thread = match worklet::spawn(inbox_rx, reply_tx) {
            Ok(handle) => handle,
            Err(err) => {
                stream.stop_tracks();
                return Err(CaptureError::WorkletLoadFailed(err.to_string()));
            }
        };

        let receipts = Arc::new(ReceiptTable::new());
        let pump_thread = match spawn_pump(
            reply_rx,
            Arc::clone(&receipts),
            Arc::clone(&self.recording),
            Arc::clone(&self.segment),
            self.delegate.clone(),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                stream.stop_tracks();
                let _ = inbox_tx.send(WorkletInput::Close);
                drop(inbox_tx);
                let _ = worklet_thread.join();
                return Err(CaptureError::WorkletLoadFailed(err.to_string()));
            }
        };

        self.worklet = Some(WorkletHandle::new(
            inbox_tx,
            receipts,
            self.config.event_timeout,
            self.config.receipt_poll_interval,
        ));
        self.stream = Some(stream);
        self.worklet_thread = Some(worklet_thread);
        self.pump_thread = Some(pump_thread);

        log::debug!("capture session connected at {} Hz", self.config.sample_rate);
        self.notify_status();
        Ok(())
    }

    /// Start recording with the default chunk threshold
    /// ([`DEFAULT_CHUNK_THRESHOLD`] mono bytes).
    pub fn record(&mut self, sink: ChunkSink) -> Result<(), CaptureError> {
        self.record_with(sink, Some(DEFAULT_CHUNK_THRESHOLD))
    }

    /// Start recording, flushing to `sink` once the accumulated mono buffer
    /// reaches `chunk_threshold` bytes; `None` forwards every frame
    /// individually.
    pub fn record_with(
        &mut self,
        sink: ChunkSink,
        chunk_threshold: Option<usize>,
    ) -> Result<(), CaptureError> {
        let worklet = self.worklet.as_ref().ok_or(CaptureError::SessionEnded)?;
        if self.recording.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        {
            let mut segment = self.segment.lock();
            segment.aggregator.reset(chunk_threshold);
            segment.sink = Some(sink);
        }

        log::debug!("recording ...");
        worklet.dispatch(RequestKind::Start)?;
        self.recording.store(true, Ordering::SeqCst);
        self.notify_status();
        Ok(())
    }

    /// Pause recording. The microphone stream stays open but frame delivery
    /// stops; any partial buffered chunk is flushed to the sink first.
    pub fn pause(&mut self) -> Result<(), CaptureError> {
        let worklet = self.worklet.as_ref().ok_or(CaptureError::SessionEnded)?;
        if !self.recording.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyPaused);
        }

        log::debug!("pausing ...");
        // The stop receipt is a barrier: every frame fed before this call has
        // been aggregated once it returns, so the flush below captures the
        // complete partial chunk.
        worklet.dispatch(RequestKind::Stop)?;
        self.flush_partial();
        self.recording.store(false, Ordering::SeqCst);
        self.notify_stopped(StopReason::Paused);
        self.notify_status();
        Ok(())
    }

    /// Snapshot the accumulated audio without stopping capture.
    pub fn read(&mut self) -> Result<ReadResult, CaptureError> {
        let worklet = self.worklet.as_ref().ok_or(CaptureError::SessionEnded)?;
        log::debug!("reading ...");
        match worklet.dispatch(RequestKind::Read)? {
            ReceiptPayload::Audio(result) => Ok(result),
            ReceiptPayload::Ack => Err(CaptureError::UnexpectedReply {
                event: "read".into(),
            }),
        }
    }

    /// Discard the worklet's accumulated audio without ending the session.
    pub fn clear(&mut self) -> Result<(), CaptureError> {
        let worklet = self.worklet.as_ref().ok_or(CaptureError::SessionEnded)?;
        worklet.dispatch(RequestKind::Clear)?;
        Ok(())
    }

    /// End the session: final flush and read, then release the device
    /// stream and worklet. Returns the final accumulated audio.
    pub fn end(&mut self) -> Result<ReadResult, CaptureError> {
        if self.worklet.is_none() {
            return Err(CaptureError::SessionEnded);
        }

        // A read failure here leaves the session connected; the caller
        // decides whether to retry or tear down. The read receipt doubles as
        // the barrier that settles any chunks still in flight.
        let result = self.read()?;

        if self.recording.load(Ordering::SeqCst) {
            self.flush_partial();
            self.recording.store(false, Ordering::SeqCst);
        }

        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
        // Dropping the handle posts `Close` to the worklet inbox: the worklet
        // exits, its reply sender drops, and the pump follows.
        self.worklet = None;
        if let Some(handle) = self.worklet_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.pump_thread.take() {
            let _ = handle.join();
        }
        self.segment.lock().clear();

        log::debug!("capture session ended");
        self.notify_stopped(StopReason::SessionEnded);
        self.notify_status();
        Ok(result)
    }

    /// Flush any partial aggregate to the sink, with the same
    /// error-as-stop-signal boundary the pump applies.
    fn flush_partial(&self) {
        let mut segment = self.segment.lock();
        let Some(chunk) = segment.aggregator.take_partial() else {
            return;
        };
        let Some(sink) = segment.sink.as_mut() else {
            return;
        };
        if let Err(err) = sink(chunk) {
            log::warn!("error in chunk sink, stopping recording: {err}");
            self.recording.store(false, Ordering::SeqCst);
            drop(segment);
            self.notify_stopped(StopReason::SinkError);
        }
    }

    fn notify_status(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_status_changed(self.get_status());
        }
    }

    fn notify_stopped(&self, reason: StopReason) {
        if let Some(delegate) = &self.delegate {
            delegate.on_recording_stopped(reason);
        }
    }

    fn notify_permission_blocked(&self) {
        log::warn!("microphone access is blocked; grant permission to record");
        if let Some(delegate) = &self.delegate {
            delegate.on_permission_blocked();
        }
    }
}

impl<P: MediaProvider> Drop for WavRecorder<P> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
        self.worklet = None;
        if let Some(handle) = self.worklet_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.pump_thread.take() {
            let _ = handle.join();
        }
    }
}
