//! Audio payload decoding for voice classification.
//!
//! This crate turns the base64 text clients submit into a waveform the
//! feature extractor can consume:
//!
//! - [`payload`]: data-URI stripping, whitespace removal, padding repair and base64 decoding
//! - [`decoder`]: container/codec decoding (MP3, WAV, FLAC, Ogg, AAC) via symphonia
//! - [`resampler`]: mono down-mix and conversion to 16kHz via rubato
//! - [`wav`]: a small PCM16 WAV writer
//!
//! # Example
//!
//! ```rust
//! use voicecheck_audio::{load_clip, payload, wav, TARGET_SAMPLE_RATE};
//!
//! // 100ms of silence at 8kHz, wrapped in a WAV container and base64-encoded.
//! let bytes = wav::encode_pcm16(&[0i16; 800], 8000, 1);
//! let body = format!("data:audio/wav;base64,{}", payload::encode(&bytes));
//!
//! let clip = load_clip(&body).unwrap();
//! assert_eq!(clip.sample_rate(), TARGET_SAMPLE_RATE);
//! assert_eq!(clip.len(), 1600);
//! ```

mod clip;
pub mod decoder;
mod error;
mod load;
pub mod payload;
pub mod resampler;
pub mod wav;

#[cfg(test)]
mod testutil;

pub use clip::{AudioClip, TARGET_SAMPLE_RATE};
pub use error::AudioError;
pub use load::{load_clip, load_clip_with_hint};
