use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};
use voicecheck_audio::{AudioClip, load_clip};

use crate::DetectError;
use crate::classifier::{Assessment, Classifier};
use crate::config::EngineConfig;
use crate::features::FeatureExtractor;
use crate::model::PretrainedClassifier;
use crate::smoother::Smoother;
use crate::verdict::{Explanation, Label, Verdict};

/// Turns a base64 audio payload into a [`Verdict`].
///
/// `detect` is total: it never fails and never panics, whatever the input.
pub trait Detect: Send + Sync {
    fn detect(&self, audio_base64: &str) -> Verdict;
}

/// The classification engine: decode, extract, classify, smooth.
///
/// Holds no per-request state; a single instance is shared across
/// concurrent requests.
pub struct Engine {
    extractor: FeatureExtractor,
    classifier: Classifier,
    smoother: Smoother,
    fallback_confidence: f64,
    model: Option<Arc<dyn PretrainedClassifier>>,
}

impl Engine {
    /// Builds an engine from `cfg`, with uniform jitter and no pretrained model.
    pub fn new(cfg: &EngineConfig) -> Result<Self, DetectError> {
        cfg.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::new(cfg.features)?,
            classifier: Classifier::new(cfg.strategy, cfg.thresholds),
            smoother: Smoother::uniform(cfg.jitter),
            fallback_confidence: cfg.fallback_confidence,
            model: None,
        })
    }

    /// Replaces the confidence smoother.
    pub fn with_smoother(mut self, smoother: Smoother) -> Self {
        self.smoother = smoother;
        self
    }

    /// Routes non-empty clips through `model` before the heuristic.
    pub fn with_model(mut self, model: Arc<dyn PretrainedClassifier>) -> Self {
        self.model = Some(model);
        self
    }

    /// Runs the full chain, returning the first error encountered.
    pub fn try_detect(&self, audio_base64: &str) -> Result<Verdict, DetectError> {
        let clip = load_clip(audio_base64)?;
        self.classify_clip(&clip)
    }

    /// Classifies an already decoded clip.
    pub fn classify_clip(&self, clip: &AudioClip) -> Result<Verdict, DetectError> {
        if clip.is_empty() {
            debug!("detect: empty clip");
            return Ok(self.present(self.classifier.assess_empty()));
        }

        if let Some(model) = &self.model {
            match model.predict(clip) {
                Ok(p) if p.score.is_finite() => {
                    let label = p.verdict_label();
                    debug!(model = model.name(), label = %p.label, score = p.score, "detect: model prediction");
                    let explanation = match label {
                        Label::AiGenerated => Explanation::ModelSynthetic,
                        Label::Human => Explanation::ModelNatural,
                    };
                    return Ok(Verdict {
                        label,
                        confidence: self.smoother.smooth(p.score as f64),
                        explanation,
                    });
                }
                Ok(p) => {
                    warn!(model = model.name(), score = p.score, "detect: model returned invalid score, using heuristic");
                }
                Err(e) => {
                    warn!(model = model.name(), "detect: model failed, using heuristic: {}", e);
                }
            }
        }

        let features = self.extractor.extract(clip.samples())?;
        let assessment = self.classifier.assess(&features);
        debug!(
            flatness = features.spectral_flatness,
            rms = features.rms_energy,
            zcr = features.zero_crossing_rate,
            rule = ?assessment.rule,
            raw_confidence = assessment.confidence,
            "detect: heuristic assessment"
        );
        Ok(self.present(assessment))
    }

    /// The conservative verdict returned when any stage fails.
    pub fn fallback(&self) -> Verdict {
        Verdict {
            label: Label::Human,
            confidence: self.smoother.smooth(self.fallback_confidence),
            explanation: Explanation::ConservativeFallback,
        }
    }

    fn present(&self, a: Assessment) -> Verdict {
        Verdict {
            label: a.label,
            confidence: self.smoother.smooth(a.confidence),
            explanation: a.explanation,
        }
    }
}

impl Detect for Engine {
    fn detect(&self, audio_base64: &str) -> Verdict {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_detect(audio_base64))) {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!("detect: falling back: {}", e);
                self.fallback()
            }
            Err(_) => {
                warn!("detect: falling back after internal panic");
                self.fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use voicecheck_audio::{payload, wav};

    use crate::classifier::Strategy;
    use crate::model::Prediction;

    fn engine() -> Engine {
        Engine::new(&EngineConfig::default())
            .unwrap()
            .with_smoother(Smoother::exact())
    }

    fn wav_payload(samples: &[f32], rate: u32) -> String {
        payload::encode(&wav::encode_pcm16(&wav::to_pcm16(samples), rate, 1))
    }

    /// Amplitude-modulated 200Hz tone: tonal and loud.
    fn voiced(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / 16000.0;
                let env = 0.5 + 0.4 * (2.0 * std::f32::consts::PI * 3.0 * t).sin();
                env * (2.0 * std::f32::consts::PI * 200.0 * t).sin() * 0.6
            })
            .collect()
    }

    struct FakeModel {
        result: Result<Prediction, String>,
        calls: AtomicUsize,
    }

    impl FakeModel {
        fn new(result: Result<Prediction, String>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PretrainedClassifier for FakeModel {
        fn name(&self) -> &str {
            "fake-model"
        }

        fn predict(&self, _clip: &AudioClip) -> Result<Prediction, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(DetectError::Model)
        }
    }

    #[test]
    fn empty_clip_verdict() {
        let v = engine().classify_clip(&AudioClip::empty()).unwrap();
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.confidence, 0.6);
        assert_eq!(v.explanation, Explanation::EmptySignal);
    }

    #[test]
    fn header_only_container_reads_as_empty_signal() {
        let body = payload::encode(&wav::encode_pcm16(&[], 16000, 1));
        let v = engine().detect(&body);
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.confidence, 0.6);
        assert_eq!(v.explanation, Explanation::EmptySignal);
    }

    #[test]
    fn malformed_base64_falls_back() {
        let v = engine().detect("!!!not base64 at all!!!");
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.confidence, 0.65);
        assert_eq!(v.explanation, Explanation::ConservativeFallback);
        assert_eq!(
            v.explanation.as_str(),
            "Audio processed with conservative fallback decision."
        );
    }

    #[test]
    fn non_audio_bytes_fall_back() {
        let v = engine().detect(&payload::encode(b"plain text pretending to be an mp3 file"));
        assert_eq!(v.explanation, Explanation::ConservativeFallback);
        assert!(matches!(
            engine().try_detect(&payload::encode(b"plain text pretending to be an mp3 file")),
            Err(DetectError::Audio(_))
        ));
    }

    #[test]
    fn fallback_with_random_jitter_stays_near_base() {
        let e = Engine::new(&EngineConfig::default()).unwrap();
        for _ in 0..200 {
            let v = e.detect("@@@@");
            assert_eq!(v.label, Label::Human);
            assert!((0.625..=0.675).contains(&v.confidence), "{}", v.confidence);
        }
    }

    #[test]
    fn silent_clip_reads_as_synthetic() {
        let v = engine().detect(&wav_payload(&vec![0.0; 16000], 16000));
        assert_eq!(v.label, Label::AiGenerated);
        assert_eq!(v.confidence, 0.95);
        assert_eq!(v.explanation, Explanation::SyntheticPatterns);
    }

    #[test]
    fn voiced_clip_reads_as_human() {
        let v = engine().detect(&wav_payload(&voiced(16000), 16000));
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.explanation, Explanation::NaturalVariation);
        assert!(v.confidence >= 0.65 && v.confidence <= 0.80);
    }

    #[test]
    fn data_uri_prefix_does_not_change_verdict() {
        let e = engine();
        let bare = wav_payload(&voiced(8000), 16000);
        let prefixed = format!("data:audio/wav;base64,{bare}");
        assert_eq!(e.detect(&bare), e.detect(&prefixed));
    }

    #[test]
    fn repeated_calls_keep_label() {
        let e = Engine::new(&EngineConfig::default()).unwrap();
        let body = wav_payload(&voiced(8000), 16000);
        let first = e.detect(&body);
        let exact = engine().detect(&body).confidence;
        for _ in 0..20 {
            let v = e.detect(&body);
            assert_eq!(v.label, first.label);
            assert!((v.confidence - exact).abs() <= 0.02 + 0.005 + 1e-9);
        }
    }

    #[test]
    fn flatness_strategy_engine() {
        let cfg = EngineConfig {
            strategy: Strategy::Flatness,
            ..EngineConfig::default()
        };
        let e = Engine::new(&cfg).unwrap().with_smoother(Smoother::exact());
        let v = e.detect(&wav_payload(&voiced(16000), 16000));
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.confidence, 0.6);
    }

    #[test]
    fn model_prediction_takes_precedence() {
        let model = FakeModel::new(Ok(Prediction {
            label: "spoof".into(),
            score: 0.912,
        }));
        let e = engine().with_model(model.clone());
        let v = e.detect(&wav_payload(&voiced(8000), 16000));
        assert_eq!(v.label, Label::AiGenerated);
        assert_eq!(v.confidence, 0.91);
        assert_eq!(v.explanation, Explanation::ModelSynthetic);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn model_failure_degrades_to_heuristic() {
        let model = FakeModel::new(Err("session crashed".into()));
        let e = engine().with_model(model.clone());
        let v = e.detect(&wav_payload(&voiced(8000), 16000));
        assert_eq!(v.label, Label::Human);
        assert_eq!(v.explanation, Explanation::NaturalVariation);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn model_invalid_score_degrades_to_heuristic() {
        let model = FakeModel::new(Ok(Prediction {
            label: "real".into(),
            score: f32::NAN,
        }));
        let v = engine().with_model(model).detect(&wav_payload(&voiced(8000), 16000));
        assert_eq!(v.explanation, Explanation::NaturalVariation);
    }

    #[test]
    fn model_is_not_consulted_for_empty_clip() {
        let model = FakeModel::new(Ok(Prediction {
            label: "fake".into(),
            score: 0.99,
        }));
        let e = engine().with_model(model.clone());
        let v = e.classify_clip(&AudioClip::empty()).unwrap();
        assert_eq!(v.explanation, Explanation::EmptySignal);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = EngineConfig {
            jitter: -0.1,
            ..EngineConfig::default()
        };
        assert!(Engine::new(&cfg).is_err());
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
