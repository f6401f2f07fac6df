//! WAV container packing and parsing.
//!
//! Produces standard 44-byte RIFF headers with 16-bit PCM payloads and
//! parses them back into per-channel f32 samples.

use crate::models::audio::AudioBlob;
use crate::models::error::CaptureError;
use crate::processing::pcm;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_header(
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
    data_size: u32,
) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
    let block_align = channels * bit_depth / 8;
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Pack per-channel f32 samples into a 16-bit PCM WAV blob at `sample_rate`.
///
/// Channels are interleaved frame-major; shorter channels are zero-padded.
pub fn pack(sample_rate: u32, channels: &[Vec<f32>]) -> AudioBlob {
    let channel_count = channels.len().max(1) as u16;
    let frame_count = channels.iter().map(Vec::len).max().unwrap_or(0);

    let mut interleaved = Vec::with_capacity(frame_count * channel_count as usize);
    for frame in 0..frame_count {
        for channel in channels {
            interleaved.push(channel.get(frame).copied().unwrap_or(0.0));
        }
    }

    let data = pcm::i16_to_bytes(&pcm::float_to_i16(&interleaved));
    let header = generate_header(sample_rate, 16, channel_count, data.len() as u32);

    let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + data.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&data);
    AudioBlob::wav(bytes)
}

/// Audio recovered from a WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channels: Vec<Vec<f32>>,
}

/// Parse a WAV container into per-channel f32 samples.
///
/// Walks the RIFF chunk list for `fmt ` and `data`; only 16-bit PCM
/// (format code 1) is supported.
pub fn parse(bytes: &[u8]) -> Result<WavAudio, CaptureError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CaptureError::DecodeFailed("not a RIFF/WAVE container".into()));
    }

    let mut format: Option<(u16, u16, u32, u16)> = None; // (code, channels, rate, bits)
    let mut data: Option<&[u8]> = None;

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let body_start = pos + 8;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| CaptureError::DecodeFailed("truncated chunk".into()))?;
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(CaptureError::DecodeFailed("fmt chunk too short".into()));
                }
                format = Some((
                    u16::from_le_bytes([body[0], body[1]]),
                    u16::from_le_bytes([body[2], body[3]]),
                    u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
                    u16::from_le_bytes([body[14], body[15]]),
                ));
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        pos = body_end + (size & 1);
    }

    let (code, channel_count, sample_rate, bit_depth) =
        format.ok_or_else(|| CaptureError::DecodeFailed("missing fmt chunk".into()))?;
    let data = data.ok_or_else(|| CaptureError::DecodeFailed("missing data chunk".into()))?;

    if code != 1 {
        return Err(CaptureError::DecodeFailed(format!(
            "unsupported format code {code}, only PCM is supported"
        )));
    }
    if bit_depth != 16 {
        return Err(CaptureError::DecodeFailed(format!(
            "unsupported bit depth {bit_depth}, only 16-bit PCM is supported"
        )));
    }
    if channel_count == 0 {
        return Err(CaptureError::DecodeFailed("zero channels".into()));
    }

    let samples = pcm::i16_to_float(&pcm::bytes_to_i16(data));
    let channel_count = channel_count as usize;
    let frame_count = samples.len() / channel_count;

    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in 0..frame_count {
        for (ch, channel) in channels.iter_mut().enumerate() {
            channel.push(samples[frame * channel_count + ch]);
        }
    }

    Ok(WavAudio {
        sample_rate,
        bit_depth,
        channels,
    })
}
