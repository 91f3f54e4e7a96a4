use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Binary classification outcome. There is no "unknown": ambiguity resolves to [`Label::Human`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    /// Synthetic speech.
    AiGenerated,
    /// Natural speech.
    Human,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI_GENERATED",
            Self::Human => "HUMAN",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of human-readable explanations a verdict can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Explanation {
    EmptySignal,
    SyntheticPatterns,
    OverlyStable,
    NaturalVariation,
    ModelSynthetic,
    ModelNatural,
    ConservativeFallback,
}

impl Explanation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptySignal => "Empty or invalid audio signal detected",
            Self::SyntheticPatterns => {
                "Highly consistent spectral patterns and synthetic speech characteristics detected"
            }
            Self::OverlyStable => {
                "Human-like but overly stable voice patterns suggest synthetic generation"
            }
            Self::NaturalVariation => "Natural pitch variation and dynamic speech patterns observed",
            Self::ModelSynthetic => "Pretrained audio classifier detected synthetic speech artifacts",
            Self::ModelNatural => "Pretrained audio classifier detected natural speech characteristics",
            Self::ConservativeFallback => "Audio processed with conservative fallback decision.",
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Explanation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result of one classification call.
///
/// `confidence` is always within `[0, 1]` and rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub explanation: Explanation,
}
