//! Fusion of the classifier label and the color heuristic into a verdict.

use crate::analyzer;
use crate::error::InferenceError;
use crate::model_handle::ModelHandle;
use crate::models::{ClassifierLabel, FreshnessVerdict, HeuristicScore, Prediction};
use crate::normalizer::DecodedFrame;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Scores strictly above this are fresh.
pub const FRESH_ABOVE: f64 = 0.7;
/// Scores strictly above this (and not fresh) are doubtful; the rest spoiled.
pub const DOUBTFUL_ABOVE: f64 = 0.4;
pub const DEGRADED_DETAILS: &str = "Error processing image";

pub fn prediction_for(score: f64) -> Prediction {
    if score > FRESH_ABOVE {
        Prediction::Fresh
    } else if score > DOUBTFUL_ABOVE {
        Prediction::Doubtful
    } else {
        Prediction::Spoiled
    }
}

fn qualifier(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Fresh => "Good color and texture detected",
        Prediction::Doubtful => "Some quality concerns detected",
        Prediction::Spoiled => "Poor quality indicators found",
    }
}

pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

pub fn fuse(label: &ClassifierLabel, heuristic: &HeuristicScore) -> FreshnessVerdict {
    let prediction = prediction_for(heuristic.score);
    FreshnessVerdict {
        prediction,
        confidence: round_confidence(heuristic.confidence),
        details: format!("Detected: {} - {}", label.label, qualifier(prediction)),
    }
}

/// Verdict returned whenever inference fails.
pub fn degraded() -> FreshnessVerdict {
    FreshnessVerdict {
        prediction: Prediction::Doubtful,
        confidence: 0.0,
        details: DEGRADED_DETAILS.to_string(),
    }
}

#[derive(Clone)]
pub struct FreshnessDetector {
    model: Arc<ModelHandle>,
    timeout: Option<Duration>,
}

impl FreshnessDetector {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self {
            model,
            timeout: None,
        }
    }

    /// Bounds each classifier call; an elapsed call degrades the verdict.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    async fn classify(&self, frame: &DecodedFrame) -> Result<ClassifierLabel, InferenceError> {
        let model = self.model.get_or_init().await?;
        let predictions = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, model.classify(frame.pixels()))
                .await
                .map_err(|_| InferenceError::TimedOut(limit))??,
            None => model.classify(frame.pixels()).await?,
        };
        let top = predictions
            .into_iter()
            .next()
            .ok_or(InferenceError::NoPrediction)?;
        Ok(ClassifierLabel {
            label: top.label,
            confidence: top.confidence.clamp(0.0, 1.0),
        })
    }

    async fn try_predict(&self, frame: &DecodedFrame) -> Result<FreshnessVerdict, InferenceError> {
        let label = self.classify(frame).await?;
        let heuristic = analyzer::analyze(frame);
        debug!(
            label = %label.label,
            label_confidence = label.confidence,
            score = heuristic.score,
            "fusing classifier and heuristic"
        );
        Ok(fuse(&label, &heuristic))
    }

    /// Always yields a verdict; inference failures become [`degraded`].
    pub async fn predict(&self, frame: &DecodedFrame) -> FreshnessVerdict {
        match self.try_predict(frame).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "inference failed, returning degraded verdict");
                degraded()
            }
        }
    }
}
