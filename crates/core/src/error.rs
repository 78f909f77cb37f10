use providers::ProviderError;
use std::time::Duration;
use thiserror::Error;

/// Failures reported to the caller of a scan. Both are user-correctable.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("could not decode image: {0}")]
    Decode(String),
}

/// Inference failures. Absorbed by the detector and never returned from a scan.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("classifier failed: {0}")]
    Classifier(#[from] ProviderError),
    #[error("classifier returned no predictions")]
    NoPrediction,
    #[error("classifier timed out after {0:?}")]
    TimedOut(Duration),
}
