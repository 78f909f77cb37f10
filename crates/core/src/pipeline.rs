use crate::config::AppConfig;
use crate::detector::FreshnessDetector;
use crate::error::ScanError;
use crate::model_handle::ModelHandle;
use crate::models::{FreshnessVerdict, SourceImage};
use crate::normalizer;
use anyhow::Context;
use providers::hosted::{HostedConfig, HostedLoader};
use providers::noop::NoopClassifier;
use providers::ClassifierRegistry;
use std::sync::Arc;
use tracing::info;

/// One scan: validate and decode, then classify and fuse.
///
/// Only input problems are errors; inference failures come back as a
/// degraded verdict.
pub async fn scan(
    detector: &FreshnessDetector,
    source: SourceImage,
) -> Result<FreshnessVerdict, ScanError> {
    let frame = normalizer::normalize(source).await?;
    Ok(detector.predict(&frame).await)
}

pub fn build_registry(config: &AppConfig) -> ClassifierRegistry {
    let hosted = HostedLoader::new(HostedConfig {
        base_url: config.classifier.base_url.clone(),
        model: config.classifier.model.clone(),
        api_key: config.classifier.api_key(),
    });
    ClassifierRegistry::new()
        .with_loader("noop", Arc::new(NoopClassifier))
        .with_loader("hosted", Arc::new(hosted))
        .set_preferred(&config.classifier.provider)
}

pub fn build_detector(config: &AppConfig) -> anyhow::Result<FreshnessDetector> {
    build_detector_with(config, &build_registry(config))
}

/// Detectors built for the same provider share one process-wide model handle,
/// so the model is loaded once no matter how many detectors exist.
pub fn build_detector_with(
    config: &AppConfig,
    registry: &ClassifierRegistry,
) -> anyhow::Result<FreshnessDetector> {
    let (provider, loader) = registry
        .resolve(None)
        .context("resolve classifier provider")?;
    info!(
        provider = %provider,
        model = %config.classifier.model,
        "classifier configured"
    );
    Ok(FreshnessDetector::new(ModelHandle::shared(&provider, loader))
        .with_timeout(config.classifier.timeout()))
}
