use serde::{Deserialize, Serialize};
use std::fmt;

/// User-supplied image as handed over by the caller.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub size: u64,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        let size = bytes.len() as u64;
        Self {
            bytes,
            mime: mime.into(),
            size,
        }
    }
}

/// Top-1 label reported by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierLabel {
    pub label: String,
    pub confidence: f32,
}

/// Output of the color heuristic. Both fields lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicScore {
    pub score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Fresh,
    Doubtful,
    Spoiled,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Fresh => "fresh",
            Prediction::Doubtful => "doubtful",
            Prediction::Spoiled => "spoiled",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessVerdict {
    pub prediction: Prediction,
    /// Rounded to two decimals.
    pub confidence: f64,
    pub details: String,
}

impl FreshnessVerdict {
    /// Confidence as a whole percentage, the way it is shown to vendors.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

impl fmt::Display for FreshnessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}% confidence): {}",
            self.prediction,
            self.confidence_percent(),
            self.details
        )
    }
}
