//! Decodes arbitrary PCM representations into a playable WAV artifact.
//!
//! Accepted input shapes are closed over by [`AudioInput`]; each variant is
//! resolved by exhaustive matching rather than runtime type inspection.

use uuid::Uuid;

use crate::models::audio::{AudioBlob, AudioBuffer, DecodedAudio};
use crate::models::error::CaptureError;
use crate::processing::{pcm, wav};

/// Minimum accepted source sample rate for raw sample input.
pub const MIN_SOURCE_SAMPLE_RATE: u32 = 3000;

/// The input shapes `decode` accepts.
///
/// `Blob` and `Bytes` are already-encoded WAV containers; the sample
/// variants are raw audio that must be packed at an explicit source rate.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioInput {
    Blob(AudioBlob),
    Bytes(Vec<u8>),
    Int16(Vec<i16>),
    Float32(Vec<f32>),
    Samples(Vec<f64>),
}

/// Decode `input` into a WAV blob, a dereferenceable URL, the first
/// channel's samples, and the full buffer resampled to `sample_rate`.
///
/// `from_sample_rate` is mandatory for raw sample input (and must be at
/// least [`MIN_SOURCE_SAMPLE_RATE`]); it must be `None` for encoded input,
/// whose container already carries its rate.
pub fn decode(
    input: AudioInput,
    sample_rate: u32,
    from_sample_rate: Option<u32>,
) -> Result<DecodedAudio, CaptureError> {
    let blob = match input {
        AudioInput::Blob(blob) => {
            ensure_no_source_rate(from_sample_rate)?;
            blob
        }
        AudioInput::Bytes(bytes) => {
            ensure_no_source_rate(from_sample_rate)?;
            AudioBlob::wav(bytes)
        }
        AudioInput::Int16(data) => pack_samples(pcm::i16_to_float(&data), from_sample_rate)?,
        AudioInput::Float32(data) => pack_samples(data, from_sample_rate)?,
        AudioInput::Samples(data) => {
            let float32 = data.iter().map(|&v| v as f32).collect();
            pack_samples(float32, from_sample_rate)?
        }
    };

    let parsed = wav::parse(&blob.bytes)?;
    let channels: Vec<Vec<f32>> = parsed
        .channels
        .iter()
        .map(|channel| pcm::resample_linear(channel, parsed.sample_rate, sample_rate))
        .collect();

    let audio_buffer = AudioBuffer {
        sample_rate,
        channels,
    };
    let values = audio_buffer
        .channel_data(0)
        .map(<[f32]>::to_vec)
        .unwrap_or_default();
    let url = format!("blob:{}", Uuid::new_v4());

    Ok(DecodedAudio {
        blob,
        url,
        values,
        audio_buffer,
    })
}

fn ensure_no_source_rate(from_sample_rate: Option<u32>) -> Result<(), CaptureError> {
    match from_sample_rate {
        None => Ok(()),
        Some(_) => Err(CaptureError::SampleRateConflict),
    }
}

fn pack_samples(
    samples: Vec<f32>,
    from_sample_rate: Option<u32>,
) -> Result<AudioBlob, CaptureError> {
    let rate = from_sample_rate.ok_or(CaptureError::MissingSourceRate)?;
    if rate < MIN_SOURCE_SAMPLE_RATE {
        return Err(CaptureError::SampleRateTooLow { rate });
    }
    Ok(wav::pack(rate, &[samples]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect()
    }

    #[test]
    fn float32_round_trip_at_source_rate() {
        let input = sine(512);
        let decoded = decode(AudioInput::Float32(input.clone()), 16000, Some(16000))
            .expect("decodes");

        assert_eq!(decoded.values.len(), input.len());
        let max_err = input
            .iter()
            .zip(&decoded.values)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3, "max abs error {max_err}");
        assert_eq!(decoded.audio_buffer.sample_rate, 16000);
        assert!(decoded.url.starts_with("blob:"));
        assert_eq!(decoded.blob.mime, "audio/wav");
    }

    #[test]
    fn int16_is_normalized_by_32768() {
        let decoded = decode(AudioInput::Int16(vec![16384, -16384]), 8000, Some(8000))
            .expect("decodes");
        assert!((decoded.values[0] - 0.5).abs() < 1e-3);
        assert!((decoded.values[1] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn plain_samples_accepted() {
        let decoded = decode(AudioInput::Samples(vec![0.0, 0.5, -0.5]), 8000, Some(8000))
            .expect("decodes");
        assert_eq!(decoded.values.len(), 3);
    }

    #[test]
    fn resamples_to_target_rate() {
        let decoded = decode(AudioInput::Float32(sine(1000)), 32000, Some(16000))
            .expect("decodes");
        // Upsampling 2x doubles the frame count.
        assert_eq!(decoded.values.len(), 2000);
        assert_eq!(decoded.audio_buffer.sample_rate, 32000);
    }

    #[test]
    fn blob_rejects_source_rate() {
        let blob = wav::pack(16000, &[sine(64)]);
        let err = decode(AudioInput::Blob(blob), 44100, Some(16000)).unwrap_err();
        assert_eq!(err, CaptureError::SampleRateConflict);
    }

    #[test]
    fn bytes_reject_source_rate() {
        let bytes = wav::pack(16000, &[sine(64)]).bytes;
        let err = decode(AudioInput::Bytes(bytes), 44100, Some(16000)).unwrap_err();
        assert_eq!(err, CaptureError::SampleRateConflict);
    }

    #[test]
    fn blob_decodes_without_source_rate() {
        let blob = wav::pack(16000, &[sine(64)]);
        let decoded = decode(AudioInput::Blob(blob), 16000, None).expect("decodes");
        assert_eq!(decoded.values.len(), 64);
    }

    #[test]
    fn float32_requires_source_rate() {
        let err = decode(AudioInput::Float32(sine(16)), 44100, None).unwrap_err();
        assert_eq!(err, CaptureError::MissingSourceRate);
    }

    #[test]
    fn source_rate_below_minimum_rejected() {
        let err = decode(AudioInput::Float32(sine(16)), 44100, Some(100)).unwrap_err();
        assert_eq!(err, CaptureError::SampleRateTooLow { rate: 100 });
    }

    #[test]
    fn malformed_bytes_fail_to_decode() {
        let err = decode(AudioInput::Bytes(vec![0; 16]), 44100, None).unwrap_err();
        assert!(matches!(err, CaptureError::DecodeFailed(_)));
    }
}
