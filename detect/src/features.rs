//! Frame-level spectral and amplitude statistics.
//!
//! Framing follows the librosa conventions the classifier thresholds were
//! tuned against:
//!
//! - Frame length 2048, hop 512
//! - Centred frames: the signal is padded by half a frame on each side
//!   (zeros for the spectrum and RMS, edge values for zero-crossing rate),
//!   giving `1 + len / hop` frames
//! - Periodic Hann window for the spectrum
//! - Power spectrum floored at `1e-10` before the flatness ratio

use serde::{Deserialize, Serialize};

use crate::DetectError;
use crate::fft::Fft;

/// Power floor applied before taking logarithms.
const AMIN: f64 = 1e-10;

/// Amplitudes at or below this magnitude count as zero when detecting crossings.
const ZERO_THRESHOLD: f64 = 1e-10;

/// Frame geometry for feature extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Samples per analysis frame. Must be a power of two.
    pub frame_length: usize,
    /// Samples between consecutive frame starts.
    pub hop_length: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

/// Summary statistics of one clip. Every value is a mean over frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Geometric over arithmetic mean of the power spectrum. Near 1 for
    /// noise-like spectra, near 0 for tonal ones.
    pub spectral_flatness: f64,
    /// Root-mean-square amplitude.
    pub rms_energy: f64,
    /// Fraction of adjacent-sample sign changes.
    pub zero_crossing_rate: f64,
}

/// Computes [`FeatureVector`]s from 16kHz mono samples.
pub struct FeatureExtractor {
    cfg: FeatureConfig,
    window: Vec<f64>,
    fft: Fft,
}

impl FeatureExtractor {
    /// Creates an extractor. Fails if the frame length is not a power of two
    /// or the hop is zero.
    pub fn new(cfg: FeatureConfig) -> Result<Self, DetectError> {
        let fft = Fft::new(cfg.frame_length).ok_or_else(|| {
            DetectError::Config(format!(
                "frame_length must be a power of two >= 2, got {}",
                cfg.frame_length
            ))
        })?;
        if cfg.hop_length == 0 {
            return Err(DetectError::Config("hop_length must be positive".into()));
        }
        Ok(Self {
            window: hann_window(cfg.frame_length),
            cfg,
            fft,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// Extracts features from normalized samples (range [-1, 1]).
    ///
    /// An empty input has no frames to average and is an
    /// [`DetectError::Extraction`]; callers handle empty clips before getting here.
    pub fn extract(&self, samples: &[f32]) -> Result<FeatureVector, DetectError> {
        if samples.is_empty() {
            return Err(DetectError::Extraction("no samples".into()));
        }

        let n = self.cfg.frame_length;
        let pad = n / 2;
        let num_frames = 1 + samples.len() / self.cfg.hop_length;
        let bins = n / 2 + 1;

        let mut frame = vec![0.0f64; n];
        let mut windowed = vec![0.0f64; n];
        let mut real = vec![0.0f64; n];
        let mut imag = vec![0.0f64; n];
        let mut power = vec![0.0f64; bins];

        let mut flatness_sum = 0.0;
        let mut rms_sum = 0.0;
        let mut zcr_sum = 0.0;

        for t in 0..num_frames {
            let start = (t * self.cfg.hop_length) as isize - pad as isize;

            // Zero-padded frame for spectrum and RMS.
            for (i, v) in frame.iter_mut().enumerate() {
                *v = sample_or_zero(samples, start + i as isize);
            }

            let energy: f64 = frame.iter().map(|s| s * s).sum();
            rms_sum += (energy / n as f64).sqrt();

            for ((w, &s), &win) in windowed.iter_mut().zip(&frame).zip(&self.window) {
                *w = s * win;
            }
            self.fft
                .power_spectrum(&windowed, &mut real, &mut imag, &mut power);
            flatness_sum += flatness(&power);

            // Edge-padded frame for zero crossings.
            for (i, v) in frame.iter_mut().enumerate() {
                *v = sample_or_edge(samples, start + i as isize);
            }
            zcr_sum += crossing_rate(&frame);
        }

        let frames = num_frames as f64;
        let features = FeatureVector {
            spectral_flatness: flatness_sum / frames,
            rms_energy: rms_sum / frames,
            zero_crossing_rate: zcr_sum / frames,
        };

        if !(features.spectral_flatness.is_finite()
            && features.rms_energy.is_finite()
            && features.zero_crossing_rate.is_finite())
        {
            return Err(DetectError::Extraction(format!(
                "non-finite features: {features:?}"
            )));
        }
        Ok(features)
    }
}

/// Periodic Hann window (the DFT-even form used for spectral analysis).
fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
        .collect()
}

fn sample_or_zero(samples: &[f32], idx: isize) -> f64 {
    if idx < 0 || idx as usize >= samples.len() {
        0.0
    } else {
        samples[idx as usize] as f64
    }
}

fn sample_or_edge(samples: &[f32], idx: isize) -> f64 {
    let last = samples.len() - 1;
    let i = idx.clamp(0, last as isize) as usize;
    samples[i] as f64
}

/// Spectral flatness of one power spectrum.
fn flatness(power: &[f64]) -> f64 {
    let n = power.len() as f64;
    let (log_sum, sum) = power.iter().fold((0.0, 0.0), |(l, s), &p| {
        let p = p.max(AMIN);
        (l + p.ln(), s + p)
    });
    (log_sum / n).exp() / (sum / n)
}

/// Fraction of positions in `frame` where the sign differs from the previous
/// sample. Near-zero values count as positive; the first position never counts.
fn crossing_rate(frame: &[f64]) -> f64 {
    let negative = |x: f64| x.abs() > ZERO_THRESHOLD && x < 0.0;
    let crossings = frame
        .windows(2)
        .filter(|w| negative(w[0]) != negative(w[1]))
        .count();
    crossings as f64 / frame.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, amplitude: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / 16000.0).sin() * amplitude)
            .collect()
    }

    /// Deterministic uniform noise in [-amplitude, amplitude].
    fn noise(amplitude: f32, n: usize) -> Vec<f32> {
        let mut state: u32 = 0x1234_5678;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default()).unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        assert!(matches!(
            FeatureExtractor::new(FeatureConfig { frame_length: 400, hop_length: 160 }),
            Err(DetectError::Config(_))
        ));
        assert!(matches!(
            FeatureExtractor::new(FeatureConfig { frame_length: 512, hop_length: 0 }),
            Err(DetectError::Config(_))
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(extractor().extract(&[]), Err(DetectError::Extraction(_))));
    }

    #[test]
    fn sine_is_tonal() {
        let f = extractor().extract(&sine(440.0, 0.5, 16000)).unwrap();
        assert!(f.spectral_flatness < 0.01, "flatness = {}", f.spectral_flatness);
        // 0.5 / sqrt(2) in the interior, pulled down by the zero-padded edge frames.
        assert!(f.rms_energy > 0.3 && f.rms_energy < 0.36, "rms = {}", f.rms_energy);
        // Two crossings per period.
        let expected = 2.0 * 440.0 / 16000.0;
        assert!((f.zero_crossing_rate - expected).abs() < 0.005, "zcr = {}", f.zero_crossing_rate);
    }

    #[test]
    fn noise_is_flat() {
        let f = extractor().extract(&noise(0.5, 16000)).unwrap();
        assert!(f.spectral_flatness > 0.3, "flatness = {}", f.spectral_flatness);
        assert!(f.zero_crossing_rate > 0.4, "zcr = {}", f.zero_crossing_rate);
    }

    #[test]
    fn silence_is_maximally_flat() {
        let f = extractor().extract(&vec![0.0; 8000]).unwrap();
        assert!((f.spectral_flatness - 1.0).abs() < 1e-9);
        assert_eq!(f.rms_energy, 0.0);
        assert_eq!(f.zero_crossing_rate, 0.0);
    }

    #[test]
    fn alternating_signal_crosses_almost_everywhere() {
        let samples: Vec<f32> = (0..16384).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let f = extractor().extract(&samples).unwrap();
        assert!(f.zero_crossing_rate > 0.9, "zcr = {}", f.zero_crossing_rate);
    }

    #[test]
    fn short_clip_still_has_a_frame() {
        let f = extractor().extract(&sine(1000.0, 0.2, 100)).unwrap();
        assert!(f.rms_energy > 0.0);
        assert!(f.spectral_flatness.is_finite());
    }

    #[test]
    fn quieter_signal_has_lower_rms() {
        let ex = extractor();
        let loud = ex.extract(&sine(300.0, 0.5, 16000)).unwrap();
        let quiet = ex.extract(&sine(300.0, 0.05, 16000)).unwrap();
        assert!((loud.rms_energy / quiet.rms_energy - 10.0).abs() < 0.01);
        assert!(loud.spectral_flatness < 0.01 && quiet.spectral_flatness < 0.01);
    }

    #[test]
    fn crossing_rate_counts_sign_changes() {
        assert_eq!(crossing_rate(&[1.0, -1.0, 1.0, -1.0]), 0.75);
        assert_eq!(crossing_rate(&[0.0, 1.0, 0.0, 1.0]), 0.0);
        assert_eq!(crossing_rate(&[-1.0, 0.0, -1.0, 0.0]), 0.75);
    }
}
