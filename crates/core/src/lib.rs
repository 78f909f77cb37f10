//! Freshness inference core: image normalization, color heuristic,
//! classifier fusion.

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod model_handle;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod session;

pub use detector::FreshnessDetector;
pub use error::{InferenceError, ScanError};
pub use models::{FreshnessVerdict, Prediction, SourceImage};
pub use normalizer::DecodedFrame;
