use crate::detector::FreshnessDetector;
use crate::error::ScanError;
use crate::models::{FreshnessVerdict, SourceImage};
use crate::pipeline;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Scanning,
    Result(FreshnessVerdict),
    Error(String),
}

/// Tracks one caller's scans. Every scan starts over from `Scanning`; a
/// terminal state is kept until the next scan or [`ScanSession::reset`].
#[derive(Debug)]
pub struct ScanSession {
    state: ScanState,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::Scanning)
    }

    pub fn result(&self) -> Option<&FreshnessVerdict> {
        match &self.state {
            ScanState::Result(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ScanState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }

    pub async fn scan(
        &mut self,
        detector: &FreshnessDetector,
        source: SourceImage,
    ) -> Result<FreshnessVerdict, ScanError> {
        self.state = ScanState::Scanning;
        let outcome = pipeline::scan(detector, source).await;
        self.state = match &outcome {
            Ok(verdict) => ScanState::Result(verdict.clone()),
            Err(e) => ScanState::Error(e.to_string()),
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_handle::ModelHandle;
    use crate::models::Prediction;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use providers::noop::NoopClassifier;
    use std::io::Cursor;
    use std::sync::Arc;

    fn detector() -> FreshnessDetector {
        FreshnessDetector::new(Arc::new(ModelHandle::new(Arc::new(NoopClassifier))))
    }

    fn png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(16, 16))
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn result_then_reset() {
        let mut session = ScanSession::new();
        assert_eq!(session.state(), &ScanState::Idle);

        let verdict = session
            .scan(&detector(), SourceImage::new(png(), "image/png"))
            .await
            .unwrap();
        assert_eq!(verdict.prediction, Prediction::Doubtful);
        assert_eq!(session.result(), Some(&verdict));
        assert!(session.error().is_none());

        session.reset();
        assert_eq!(session.state(), &ScanState::Idle);
    }

    #[tokio::test]
    async fn rejected_input_is_an_error_state() {
        let mut session = ScanSession::new();
        let err = session
            .scan(&detector(), SourceImage::new(png(), "image/gif"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
        assert_eq!(session.error(), Some(err.to_string().as_str()));
        assert!(!session.is_scanning());
    }

    #[tokio::test]
    async fn new_scan_clears_previous_outcome() {
        let mut session = ScanSession::new();
        let d = detector();
        let _ = session.scan(&d, SourceImage::new(vec![1, 2, 3], "image/png")).await;
        assert!(session.error().is_some());

        session
            .scan(&d, SourceImage::new(png(), "image/png"))
            .await
            .unwrap();
        assert!(session.error().is_none());
        assert!(session.result().is_some());
    }
}
