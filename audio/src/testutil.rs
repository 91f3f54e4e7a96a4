use std::f32::consts::PI;

use crate::wav;

pub(crate) fn sine_i16(freq: f32, rate: u32, n: usize, amplitude: f32) -> Vec<i16> {
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin() * amplitude)
        .collect();
    wav::to_pcm16(&samples)
}

/// Silent MPEG-1 Layer III stream: 128kbps, 44.1kHz, mono, 1152 samples
/// per frame. A zeroed frame body decodes to silence.
pub(crate) fn mp3_silence(frames: usize) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut out = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        let start = out.len();
        out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0xC4]);
        out.resize(start + FRAME_LEN, 0);
    }
    out
}

pub(crate) fn wav_bytes(samples: &[i16], rate: u32, channels: u16) -> Vec<u8> {
    wav::encode_pcm16(samples, rate, channels)
}
