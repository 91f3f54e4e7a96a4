//! ONNX Runtime backend for [`PretrainedClassifier`].
//!
//! Expects a waveform classifier (wav2vec2-style) taking `[1, samples]` f32
//! input at 16kHz and producing `[1, num_labels]` logits.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use voicecheck_audio::AudioClip;

use crate::DetectError;
use crate::model::{Prediction, PretrainedClassifier};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    labels: Vec<String>,
    name: String,
}

impl OnnxClassifier {
    /// Loads a model from disk. `labels` names the output classes in logit order.
    pub fn load(path: impl AsRef<Path>, labels: Vec<String>) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let session = Session::builder()
            .map_err(|e| DetectError::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectError::Model(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| DetectError::Model(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| DetectError::Model(e.to_string()))?;

        let input_name = session
            .inputs
            .iter()
            .find(|i| i.name == "input_values")
            .map(|i| i.name.clone())
            .or_else(|| session.inputs.first().map(|i| i.name.clone()))
            .ok_or_else(|| DetectError::Model("model has no inputs".to_string()))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == "logits")
            .map(|o| o.name.clone())
            .or_else(|| session.outputs.first().map(|o| o.name.clone()))
            .ok_or_else(|| DetectError::Model("model has no outputs".to_string()))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            labels,
            name,
        })
    }
}

impl PretrainedClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, clip: &AudioClip) -> Result<Prediction, DetectError> {
        let input_values = normalize(clip.samples());
        let len = input_values.len() as i64;

        let input = Tensor::from_array(([1i64, len], input_values))
            .map_err(|e| DetectError::Model(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectError::Model("lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| DetectError::Model(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| DetectError::Model("missing model output".to_string()))?;

        let (_shape, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectError::Model(e.to_string()))?;

        top1(logits, &self.labels)
    }
}

/// Zero-mean, unit-variance normalization expected by wav2vec2 feature extractors.
fn normalize(samples: &[f32]) -> Vec<f32> {
    let n = samples.len().max(1) as f32;
    let mean = samples.iter().sum::<f32>() / n;
    let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / n;
    let std = (var + 1e-7).sqrt();
    samples.iter().map(|s| (s - mean) / std).collect()
}

/// Softmax over `logits`, returning the most probable class.
fn top1(logits: &[f32], labels: &[String]) -> Result<Prediction, DetectError> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return Err(DetectError::Model("empty or non-finite logits".to_string()));
    }
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    let (idx, best) = exps
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |acc, (i, &e)| if e > acc.1 { (i, e) } else { acc });

    let label = labels
        .get(idx)
        .cloned()
        .unwrap_or_else(|| format!("LABEL_{idx}"));
    Ok(Prediction {
        label,
        score: best / sum,
    })
}
