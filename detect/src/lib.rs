//! Synthetic-speech detection for short voice clips.
//!
//! # Architecture
//!
//! A request flows through four stages, all synchronous:
//!
//! 1. [`voicecheck_audio::load_clip`]: base64 payload -> 16kHz mono [`AudioClip`]
//! 2. [`FeatureExtractor::extract`]: waveform -> [`FeatureVector`]
//!    (spectral flatness, RMS energy, zero-crossing rate)
//! 3. [`Classifier::assess`]: features -> label, raw confidence, explanation
//! 4. [`Smoother::smooth`]: raw confidence -> jittered, clamped, 2-decimal confidence
//!
//! [`Engine`] wires the stages together. Its [`Detect::detect`] is total:
//! any decode, format or extraction failure yields the conservative
//! fallback verdict (`HUMAN`, ~0.65) instead of an error.
//!
//! An optional [`PretrainedClassifier`] can be attached to the engine; when
//! present it is consulted first, and the heuristic takes over whenever it
//! fails.
//!
//! ```rust
//! use voicecheck_detect::{Detect, Engine, EngineConfig, Label, Smoother};
//!
//! let engine = Engine::new(&EngineConfig::default())
//!     .unwrap()
//!     .with_smoother(Smoother::exact());
//!
//! let verdict = engine.detect("definitely not base64 audio");
//! assert_eq!(verdict.label, Label::Human);
//! assert_eq!(verdict.confidence, 0.65);
//! ```

mod classifier;
mod config;
mod engine;
mod error;
mod features;
mod fft;
mod model;
#[cfg(feature = "onnx")]
mod model_onnx;
mod smoother;
mod verdict;

pub use classifier::{Assessment, Classifier, Rule, Strategy, Thresholds};
pub use config::{EngineConfig, ModelConfig};
pub use engine::{Detect, Engine};
pub use error::DetectError;
pub use features::{FeatureConfig, FeatureExtractor, FeatureVector};
pub use model::{PretrainedClassifier, Prediction, load_pretrained, map_label};
#[cfg(feature = "onnx")]
pub use model_onnx::OnnxClassifier;
pub use smoother::{FixedJitter, Jitter, Smoother, UniformJitter, round2};
pub use verdict::{Explanation, Label, Verdict};
pub use voicecheck_audio::AudioClip;
