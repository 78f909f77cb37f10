//! Process-wide, lazily loaded classifier.

use providers::{ClassifierLoader, ImageClassifier, ProviderError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::OnceCell;
use tracing::info;

/// Loads the classifier on first use and shares it afterwards.
///
/// Concurrent first callers wait on the same in-flight load; the loader runs
/// again only if a previous attempt failed.
pub struct ModelHandle {
    loader: Arc<dyn ClassifierLoader>,
    model: OnceCell<Arc<dyn ImageClassifier>>,
}

static SHARED: OnceLock<Mutex<HashMap<String, Arc<ModelHandle>>>> = OnceLock::new();

impl ModelHandle {
    /// The process-wide handle for `provider`. The first caller's loader is
    /// kept; later callers get the same handle and therefore the same model.
    pub fn shared(provider: &str, loader: Arc<dyn ClassifierLoader>) -> Arc<ModelHandle> {
        let handles = SHARED.get_or_init(Default::default);
        let mut handles = handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(ModelHandle::new(loader)))
            .clone()
    }

    /// A private handle; production code goes through [`ModelHandle::shared`].
    pub(crate) fn new(loader: Arc<dyn ClassifierLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    pub async fn get_or_init(&self) -> Result<Arc<dyn ImageClassifier>, ProviderError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                info!("loading classifier");
                let model = self.loader.load().await?;
                info!("classifier loaded");
                Ok::<_, ProviderError>(model)
            })
            .await?;
        Ok(Arc::clone(model))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }
}
