use crate::{Classification, ClassifierLoader, ImageClassifier, ProviderError};
use image::RgbImage;
use std::sync::Arc;

/// Classifier that always fails. Scans using it resolve to the degraded verdict.
#[derive(Debug, Default)]
pub struct NoopClassifier;

#[async_trait::async_trait]
impl ImageClassifier for NoopClassifier {
    async fn classify(&self, _frame: &RgbImage) -> Result<Vec<Classification>, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for NoopClassifier {
    async fn load(&self) -> Result<Arc<dyn ImageClassifier>, ProviderError> {
        Ok(Arc::new(NoopClassifier))
    }
}
