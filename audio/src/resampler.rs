//! Channel mixing and sample rate conversion for decoded PCM.
//!
//! Resampling uses rubato's FFT resampler, a pure Rust implementation
//! without any FFI dependencies. Whole clips are converted in one pass:
//! input is fed in fixed-size chunks, the tail is flushed with silence, and
//! the resampler's output delay is trimmed so that sample `i` of the output
//! lines up with time `i / to_rate` of the input.

use rubato::{FftFixedInOut, Resampler as RubatoResampler};

use crate::AudioError;

/// Frames per processing block handed to the FFT resampler.
const CHUNK_FRAMES: usize = 1024;

/// Averages interleaved multi-channel samples into mono, appending to `out`.
///
/// A trailing partial frame is ignored. `channels == 0` is treated as mono.
pub fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

/// Converts mono `samples` from `from_rate` to `to_rate`.
///
/// The output holds `ceil(len * to_rate / from_rate)` samples.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "invalid sample rate conversion {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_FRAMES, 1)?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;

    let mut input = vec![Vec::with_capacity(resampler.input_frames_max())];
    let mut output = vec![vec![0.0f32; resampler.output_frames_max()]];
    let mut resampled = Vec::with_capacity(expected + delay + resampler.output_frames_max());
    let mut pos = 0;

    while resampled.len() < expected + delay {
        let needed = resampler.input_frames_next();
        input[0].clear();
        if pos < samples.len() {
            let end = (pos + needed).min(samples.len());
            input[0].extend_from_slice(&samples[pos..end]);
            pos = end;
        }
        // Zero-pad the last partial chunk, then keep feeding silence to flush the delay line.
        input[0].resize(needed, 0.0);

        let (_, written) = resampler.process_into_buffer(&input, &mut output, None)?;
        resampled.extend_from_slice(&output[0][..written]);
    }

    resampled.drain(..delay);
    resampled.truncate(expected);
    Ok(resampled)
}
