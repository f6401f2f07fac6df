//! Pure PCM sample math: f32 ↔ i16 conversion, byte packing, downmixing,
//! and linear resampling. No platform dependencies.

/// Convert f32 samples `[-1.0, 1.0]` to 16-bit PCM.
///
/// Out-of-range values are clamped. Scaling is asymmetric (negative × 32768,
/// positive × 32767) so that -1.0 maps to i16::MIN and 1.0 to i16::MAX.
pub fn float_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            let clamped = sample.clamp(-1.0, 1.0);
            if clamped < 0.0 {
                (clamped * 0x8000 as f32) as i16
            } else {
                (clamped * 0x7FFF as f32) as i16
            }
        })
        .collect()
}

/// Normalize 16-bit PCM samples to f32 by dividing by 32768.
pub fn i16_to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Serialize i16 samples to little-endian bytes.
pub fn i16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Deserialize little-endian bytes to i16 samples. A trailing odd byte is
/// ignored.
pub fn bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Downmix interleaved multi-channel audio to mono by averaging channels
/// per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let frame_count = samples.len() / channels;
    let scale = 1.0 / channels as f32;
    let mut mono = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut sum = 0.0f32;
        for ch in 0..channels {
            sum += samples[frame * channels + ch];
        }
        mono.push(sum * scale);
    }
    mono
}

/// Linear interpolation resampling for mono audio.
///
/// Returns the input unchanged if the rates match.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_count = (samples.len() as f64 * ratio) as usize;
    if output_count == 0 {
        return Vec::new();
    }

    let mut output = vec![0.0f32; output_count];
    for (i, sample) in output.iter_mut().enumerate() {
        let source_index = i as f64 / ratio;
        let index = source_index as usize;
        let fraction = (source_index - index as f64) as f32;

        if index + 1 < samples.len() {
            *sample = samples[index] * (1.0 - fraction) + samples[index + 1] * fraction;
        } else if index < samples.len() {
            *sample = samples[index];
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn float_to_i16_endpoints() {
        let converted = float_to_i16(&[0.0, 1.0, -1.0]);
        assert_eq!(converted, vec![0, i16::MAX, i16::MIN]);
    }

    #[test]
    fn float_to_i16_clamps_out_of_range() {
        let converted = float_to_i16(&[2.0, -3.0]);
        assert_eq!(converted, vec![i16::MAX, i16::MIN]);
    }

    #[test]
    fn i16_round_trip_is_close() {
        let original = vec![0.0f32, 0.25, -0.5, 0.99];
        let recovered = i16_to_float(&float_to_i16(&original));
        for (a, b) in original.iter().zip(&recovered) {
            assert_abs_diff_eq!(a, b, epsilon = 1.0 / 32768.0);
        }
    }

    #[test]
    fn byte_round_trip() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN];
        assert_eq!(bytes_to_i16(&i16_to_bytes(&samples)), samples);
    }

    #[test]
    fn bytes_to_i16_ignores_trailing_byte() {
        assert_eq!(bytes_to_i16(&[0x01, 0x00, 0xFF]), vec![1]);
    }

    #[test]
    fn downmix_stereo() {
        let stereo = [0.2, 0.8, 0.4, 0.6];
        let mono = downmix_to_mono(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert_abs_diff_eq!(mono[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(mono[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn resample_same_rate_is_passthrough() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(resample_linear(&samples, 48000, 48000), samples);
    }

    #[test]
    fn resample_upsample_2x() {
        let result = resample_linear(&[0.0, 1.0], 24000, 48000);
        assert_eq!(result.len(), 4);
        assert_abs_diff_eq!(result[0], 0.0, epsilon = 0.01);
        // Midpoint interpolates to ~0.5
        assert_abs_diff_eq!(result[1], 0.5, epsilon = 0.1);
    }

    #[test]
    fn resample_downsample_halves_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        assert_eq!(resample_linear(&samples, 48000, 24000).len(), 50);
    }
}
