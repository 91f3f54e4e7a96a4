use std::sync::Arc;

use voicecheck_audio::AudioClip;

use crate::DetectError;
use crate::config::ModelConfig;
use crate::verdict::Label;

/// Top-1 output of a pretrained classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Class name as reported by the model (e.g. "fake", "bonafide").
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub score: f32,
}

impl Prediction {
    /// Maps the model's label space onto [`Label`].
    pub fn verdict_label(&self) -> Label {
        map_label(&self.label)
    }
}

/// A pretrained audio classifier that can stand in for the heuristic.
///
/// Implementations are created once at startup and shared read-only across
/// requests, so they must be safe for concurrent use.
pub trait PretrainedClassifier: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Classifies a non-empty 16kHz mono clip.
    fn predict(&self, clip: &AudioClip) -> Result<Prediction, DetectError>;
}

/// Labels containing "fake" or "spoof" (any case) are synthetic; anything else is human.
pub fn map_label(label: &str) -> Label {
    let label = label.to_lowercase();
    if label.contains("fake") || label.contains("spoof") {
        Label::AiGenerated
    } else {
        Label::Human
    }
}

/// Loads the classifier described by `cfg`.
///
/// Only ONNX models are supported, and only when the crate is built with the
/// `onnx` feature; otherwise this returns [`DetectError::Model`].
pub fn load_pretrained(cfg: &ModelConfig) -> Result<Arc<dyn PretrainedClassifier>, DetectError> {
    #[cfg(feature = "onnx")]
    {
        let model = crate::model_onnx::OnnxClassifier::load(&cfg.path, cfg.labels.clone())?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    {
        Err(DetectError::Model(format!(
            "cannot load {}: built without the `onnx` feature",
            cfg.path.display()
        )))
    }
}
