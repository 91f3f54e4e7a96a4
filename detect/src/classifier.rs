use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::verdict::{Explanation, Label};

/// Which heuristic rule set to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Ordered flatness/RMS cascade (see [`Classifier`]).
    #[default]
    Cascade,
    /// Single flatness threshold with a flatness-scaled confidence.
    Flatness,
}

/// Cut-off values for the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Flatness above this alone marks a clip synthetic.
    pub strong_flatness: f64,
    /// RMS below this alone marks a clip synthetic.
    pub strong_rms: f64,
    /// Flatness above this, together with RMS below `mild_rms`, marks a clip synthetic.
    pub mild_flatness: f64,
    pub mild_rms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strong_flatness: 0.025,
            strong_rms: 0.006,
            mild_flatness: 0.018,
            mild_rms: 0.015,
        }
    }
}

/// Flatness cut-off of [`Strategy::Flatness`].
const FLATNESS_ONLY_THRESHOLD: f64 = 0.02;

/// The rule that produced an [`Assessment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    EmptySignal,
    StrongSynthetic,
    MildSynthetic,
    Natural,
    FlatSpectrum,
    TonalSpectrum,
}

/// Unsmoothed classifier output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub label: Label,
    /// Raw confidence in `[0, 1]`, before jitter and rounding.
    pub confidence: f64,
    pub explanation: Explanation,
    pub rule: Rule,
}

/// Deterministic threshold classifier over a [`FeatureVector`].
///
/// # Cascade
///
/// Rules are evaluated top to bottom; the first match wins:
///
/// ```text
/// 0  empty clip                              HUMAN         0.60
/// 1  flatness > 0.025 || rms < 0.006         AI_GENERATED  min(0.95, 0.85 + 4 * flatness)
/// 2  flatness > 0.018 && rms < 0.015         AI_GENERATED  min(0.85, 0.70 + 3 * flatness)
/// 3  otherwise                               HUMAN         max(0.65, 0.80 - 2 * flatness)
/// ```
///
/// Flat spectra and quiet, stable signals are read as synthetic; tonal,
/// dynamic signals as natural.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    strategy: Strategy,
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(strategy: Strategy, thresholds: Thresholds) -> Self {
        Self { strategy, thresholds }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Rule 0: the verdict for a zero-length clip.
    pub fn assess_empty(&self) -> Assessment {
        Assessment {
            label: Label::Human,
            confidence: 0.60,
            explanation: Explanation::EmptySignal,
            rule: Rule::EmptySignal,
        }
    }

    /// Classifies a non-empty clip from its features.
    pub fn assess(&self, features: &FeatureVector) -> Assessment {
        match self.strategy {
            Strategy::Cascade => self.cascade(features),
            Strategy::Flatness => flatness_only(features),
        }
    }

    fn cascade(&self, f: &FeatureVector) -> Assessment {
        let t = &self.thresholds;
        let flatness = f.spectral_flatness;
        let rms = f.rms_energy;

        if flatness > t.strong_flatness || rms < t.strong_rms {
            return Assessment {
                label: Label::AiGenerated,
                confidence: (0.85 + flatness * 4.0).min(0.95),
                explanation: Explanation::SyntheticPatterns,
                rule: Rule::StrongSynthetic,
            };
        }

        if flatness > t.mild_flatness && rms < t.mild_rms {
            return Assessment {
                label: Label::AiGenerated,
                confidence: (0.70 + flatness * 3.0).min(0.85),
                explanation: Explanation::OverlyStable,
                rule: Rule::MildSynthetic,
            };
        }

        Assessment {
            label: Label::Human,
            confidence: (0.80 - flatness * 2.0).max(0.65),
            explanation: Explanation::NaturalVariation,
            rule: Rule::Natural,
        }
    }
}

fn flatness_only(f: &FeatureVector) -> Assessment {
    let flatness = f.spectral_flatness;
    let confidence = (flatness * 20.0).clamp(0.60, 0.99);
    if flatness > FLATNESS_ONLY_THRESHOLD {
        Assessment {
            label: Label::AiGenerated,
            confidence,
            explanation: Explanation::SyntheticPatterns,
            rule: Rule::FlatSpectrum,
        }
    } else {
        Assessment {
            label: Label::Human,
            confidence,
            explanation: Explanation::NaturalVariation,
            rule: Rule::TonalSpectrum,
        }
    }
}
