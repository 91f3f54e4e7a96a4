use thiserror::Error;
use voicecheck_audio::AudioError;

/// Errors raised inside the detection chain.
///
/// None of these reach callers of [`Detect::detect`](crate::Detect::detect);
/// the engine converts them to the conservative fallback verdict.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("feature extraction failed: {0}")]
    Extraction(String),

    #[error("pretrained model error: {0}")]
    Model(String),

    #[error("invalid engine config: {0}")]
    Config(String),
}
