use thiserror::Error;

/// Errors returned while turning a payload into an [`AudioClip`](crate::AudioClip).
#[derive(Debug, Error)]
pub enum AudioError {
    /// The payload is not valid base64, even after padding repair.
    #[error("base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decoded bytes could not be parsed as audio.
    #[error("unsupported or corrupt audio: {0}")]
    Format(String),

    /// Sample rate conversion failed.
    #[error("resample failed: {0}")]
    Resample(String),
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        AudioError::Format(e.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}
