use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DetectError;
use crate::classifier::{Strategy, Thresholds};
use crate::features::FeatureConfig;

/// Engine settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: Strategy,
    /// Symmetric bound of the uniform confidence jitter. `0` disables it.
    pub jitter: f64,
    /// Raw confidence of the conservative fallback verdict.
    pub fallback_confidence: f64,
    pub thresholds: Thresholds,
    pub features: FeatureConfig,
    /// Optional pretrained classifier, tried before the heuristic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            jitter: 0.02,
            fallback_confidence: 0.65,
            thresholds: Thresholds::default(),
            features: FeatureConfig::default(),
            model: None,
        }
    }
}

impl EngineConfig {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), DetectError> {
        if !(0.0..=0.5).contains(&self.jitter) {
            return Err(DetectError::Config(format!(
                "jitter must be within [0, 0.5], got {}",
                self.jitter
            )));
        }
        if !(0.0..=1.0).contains(&self.fallback_confidence) {
            return Err(DetectError::Config(format!(
                "fallback_confidence must be within [0, 1], got {}",
                self.fallback_confidence
            )));
        }
        if let Some(model) = &self.model {
            if model.labels.is_empty() {
                return Err(DetectError::Config("model.labels must not be empty".into()));
            }
        }
        Ok(())
    }
}

/// Location and label space of a pretrained audio classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the model file.
    pub path: PathBuf,
    /// Output class names, in logit order.
    pub labels: Vec<String>,
}
