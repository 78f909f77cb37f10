//! Classifier capability: the boundary between the freshness core and an
//! external pretrained image-labeling model.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod hosted;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("could not encode frame: {0}")]
    Encode(String),
}

/// One label produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Model probability in `[0, 1]`.
    pub confidence: f32,
}

/// A loaded model. Shared read-only across concurrent scans once loaded.
#[async_trait::async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Ranked predictions for the frame, best first.
    async fn classify(&self, frame: &RgbImage) -> Result<Vec<Classification>, ProviderError>;
}

/// Produces a ready-to-use classifier. The core's lazy model handle calls it
/// on first use and again only after a failed load.
#[async_trait::async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ImageClassifier>, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ClassifierRegistry {
    loaders: HashMap<String, Arc<dyn ClassifierLoader>>,
    pub preferred: Option<String>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, name: &str, loader: Arc<dyn ClassifierLoader>) -> Self {
        self.loaders.insert(name.to_string(), loader);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn loader(&self, name: Option<&str>) -> Result<Arc<dyn ClassifierLoader>, ProviderError> {
        self.resolve(name).map(|(_, loader)| loader)
    }

    /// Like [`ClassifierRegistry::loader`], also returning the key it resolved to.
    pub fn resolve(
        &self,
        name: Option<&str>,
    ) -> Result<(String, Arc<dyn ClassifierLoader>), ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no classifier provider configured".into())
            })?;
        match self.loaders.get(&key) {
            Some(loader) => Ok((key, loader.clone())),
            None => Err(ProviderError::UnknownProvider(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop::NoopClassifier;

    #[test]
    fn registry_falls_back_to_preferred() {
        let reg = ClassifierRegistry::new()
            .with_loader("noop", Arc::new(NoopClassifier))
            .set_preferred("noop");
        assert!(reg.loader(None).is_ok());
        assert!(reg.loader(Some("noop")).is_ok());
        let (key, _) = reg.resolve(None).unwrap();
        assert_eq!(key, "noop");
    }

    #[test]
    fn registry_reports_unknown_names() {
        let reg = ClassifierRegistry::new().with_loader("noop", Arc::new(NoopClassifier));
        match reg.loader(Some("mobilenet")) {
            Err(ProviderError::UnknownProvider(name)) => assert_eq!(name, "mobilenet"),
            other => panic!("unexpected: {:?}", other.err()),
        }
        assert!(matches!(
            reg.loader(None),
            Err(ProviderError::UnknownProvider(_))
        ));
    }
}
