//! The audio processing unit.
//!
//! Runs on its own thread, isolated from session logic: all communication
//! goes through its inbox channel, no shared memory. The inbox is a single
//! FIFO queue carrying both sample buffers and control requests, so a
//! receipt always reflects every frame delivered ahead of its request.
//! Incoming buffers are converted to paired raw/mono 16-bit PCM frames and
//! streamed back while started.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::models::audio::{AudioChunk, ReadResult};
use crate::processing::pcm;

use super::protocol::{ReceiptPayload, RequestKind, WorkletReply, WorkletRequest};

/// One buffer of interleaved f32 samples from the device stream.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SampleBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
}

/// Messages posted to the worklet's inbox.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WorkletInput {
    Request(WorkletRequest),
    Samples(SampleBuffer),
    /// Tear the worklet down.
    Close,
}

/// Spawn the worklet thread. It exits on `Close` or when the inbox
/// disconnects.
pub(crate) fn spawn(
    inbox: Receiver<WorkletInput>,
    replies: Sender<WorkletReply>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("audio-worklet".into())
        .spawn(move || run(inbox, replies))
}

fn run(inbox: Receiver<WorkletInput>, replies: Sender<WorkletReply>) {
    let mut processor = AudioProcessor::new(replies);
    while let Ok(message) = inbox.recv() {
        match message {
            WorkletInput::Request(request) => processor.handle_request(request),
            WorkletInput::Samples(buffer) => processor.handle_samples(buffer),
            WorkletInput::Close => break,
        }
    }
    log::debug!("audio worklet shut down");
}

struct AudioProcessor {
    started: bool,
    /// Accumulated f32 history per channel while started.
    channels: Vec<Vec<f32>>,
    replies: Sender<WorkletReply>,
}

impl AudioProcessor {
    fn new(replies: Sender<WorkletReply>) -> Self {
        Self {
            started: false,
            channels: Vec::new(),
            replies,
        }
    }

    fn handle_request(&mut self, request: WorkletRequest) {
        let payload = match request.event {
            RequestKind::Start => {
                self.started = true;
                ReceiptPayload::Ack
            }
            RequestKind::Stop => {
                self.started = false;
                ReceiptPayload::Ack
            }
            RequestKind::Clear => {
                self.channels.clear();
                ReceiptPayload::Ack
            }
            RequestKind::Read => ReceiptPayload::Audio(self.snapshot()),
        };
        let _ = self.replies.send(WorkletReply::Receipt {
            id: request.id,
            data: payload,
        });
    }

    fn handle_samples(&mut self, buffer: SampleBuffer) {
        if !self.started || buffer.samples.is_empty() {
            return;
        }

        let channel_count = buffer.channels.max(1) as usize;
        if self.channels.len() < channel_count {
            self.channels.resize_with(channel_count, Vec::new);
        }

        let frame_count = buffer.samples.len() / channel_count;
        for frame in 0..frame_count {
            for (ch, channel) in self.channels.iter_mut().enumerate().take(channel_count) {
                channel.push(buffer.samples[frame * channel_count + ch]);
            }
        }

        let raw = pcm::i16_to_bytes(&pcm::float_to_i16(&buffer.samples));
        let mono_samples = pcm::downmix_to_mono(&buffer.samples, channel_count);
        let mono = pcm::i16_to_bytes(&pcm::float_to_i16(&mono_samples));

        let _ = self.replies.send(WorkletReply::Chunk {
            data: AudioChunk { raw, mono },
        });
    }

    fn snapshot(&self) -> ReadResult {
        let frame_count = self.channels.iter().map(Vec::len).max().unwrap_or(0);
        let mut mean_values = vec![0.0f32; frame_count];
        for channel in &self.channels {
            for (i, &sample) in channel.iter().enumerate() {
                mean_values[i] += sample;
            }
        }
        let divisor = self.channels.len().max(1) as f32;
        for value in &mut mean_values {
            *value /= divisor;
        }

        ReadResult {
            mean_values,
            channels: self.channels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct Harness {
        inbox: Sender<WorkletInput>,
        replies: Receiver<WorkletReply>,
        handle: Option<JoinHandle<()>>,
        next_id: u64,
    }

    impl Harness {
        fn start() -> Self {
            let (inbox_tx, inbox_rx) = unbounded();
            let (reply_tx, reply_rx) = unbounded();
            let handle = spawn(inbox_rx, reply_tx).expect("spawn worklet");
            Self {
                inbox: inbox_tx,
                replies: reply_rx,
                handle: Some(handle),
                next_id: 0,
            }
        }

        fn feed(&self, samples: &[f32], channels: u16) {
            self.inbox
                .send(WorkletInput::Samples(SampleBuffer {
                    samples: samples.to_vec(),
                    channels,
                }))
                .expect("send samples");
        }

        fn request(&mut self, kind: RequestKind) -> ReceiptPayload {
            let id = self.next_id;
            self.next_id += 1;
            self.inbox
                .send(WorkletInput::Request(WorkletRequest { event: kind, id }))
                .expect("send request");
            loop {
                let reply = self
                    .replies
                    .recv_timeout(Duration::from_secs(2))
                    .expect("reply");
                if let WorkletReply::Receipt { id: got, data } = reply {
                    assert_eq!(got, id);
                    return data;
                }
            }
        }

        fn next_chunk(&self) -> AudioChunk {
            loop {
                match self
                    .replies
                    .recv_timeout(Duration::from_secs(2))
                    .expect("reply")
                {
                    WorkletReply::Chunk { data } => return data,
                    WorkletReply::Receipt { .. } => {}
                }
            }
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = self.inbox.send(WorkletInput::Close);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    #[test]
    fn frames_stream_only_while_started() {
        let mut harness = Harness::start();
        harness.feed(&[0.5; 8], 1);

        // Not started: the read barrier shows no chunk and no history.
        match harness.request(RequestKind::Read) {
            ReceiptPayload::Audio(result) => assert!(result.mean_values.is_empty()),
            other => panic!("expected audio payload, got {other:?}"),
        }

        assert_eq!(harness.request(RequestKind::Start), ReceiptPayload::Ack);
        harness.feed(&[0.5; 8], 1);

        let chunk = harness.next_chunk();
        assert_eq!(chunk.mono.len(), 16); // 8 samples * 2 bytes
        assert_eq!(chunk.raw.len(), 16);
    }

    #[test]
    fn stereo_buffers_produce_downmixed_mono() {
        let mut harness = Harness::start();
        harness.request(RequestKind::Start);
        harness.feed(&[0.2, 0.8, 0.4, 0.6], 2);

        let chunk = harness.next_chunk();
        assert_eq!(chunk.raw.len(), 8); // 4 interleaved samples
        assert_eq!(chunk.mono.len(), 4); // 2 downmixed frames

        let mono = pcm::bytes_to_i16(&chunk.mono);
        // Both frames average to 0.5.
        let expected = pcm::float_to_i16(&[0.5, 0.5]);
        assert_eq!(mono, expected);
    }

    #[test]
    fn read_returns_accumulated_history_and_means() {
        let mut harness = Harness::start();
        harness.request(RequestKind::Start);
        harness.feed(&[0.2, 0.4], 2);

        match harness.request(RequestKind::Read) {
            ReceiptPayload::Audio(result) => {
                assert_eq!(result.channels.len(), 2);
                assert_eq!(result.channels[0], vec![0.2]);
                assert_eq!(result.channels[1], vec![0.4]);
                assert!((result.mean_values[0] - 0.3).abs() < 1e-6);
            }
            other => panic!("expected audio payload, got {other:?}"),
        }
    }

    #[test]
    fn clear_discards_history() {
        let mut harness = Harness::start();
        harness.request(RequestKind::Start);
        harness.feed(&[0.5; 4], 1);
        harness.next_chunk();

        harness.request(RequestKind::Clear);
        match harness.request(RequestKind::Read) {
            ReceiptPayload::Audio(result) => assert!(result.mean_values.is_empty()),
            other => panic!("expected audio payload, got {other:?}"),
        }
    }

    #[test]
    fn stop_halts_frame_stream() {
        let mut harness = Harness::start();
        harness.request(RequestKind::Start);
        harness.request(RequestKind::Stop);
        harness.feed(&[0.5; 4], 1);

        // The read barrier passes with no chunk in between.
        match harness.request(RequestKind::Read) {
            ReceiptPayload::Audio(_) => {}
            other => panic!("expected audio payload, got {other:?}"),
        }
        assert!(harness.replies.try_recv().is_err());
    }
}
