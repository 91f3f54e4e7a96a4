use std::time::Duration;

/// Sample rate every decoded clip is converted to.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// A decoded mono waveform.
///
/// Samples are normalized f32 in `[-1, 1]`. A clip with no samples is valid:
/// it is what a payload holding a well-formed but empty container decodes to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    /// Creates a clip from mono samples at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Creates a zero-length clip at the target sample rate.
    pub fn empty() -> Self {
        Self::new(Vec::new(), TARGET_SAMPLE_RATE)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the playback duration of the clip.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
