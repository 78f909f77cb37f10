use crate::{Classification, ClassifierLoader, ImageClassifier, ProviderError};
use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Image classification served by a hosted inference endpoint
/// (`POST {base_url}/models/{model}` with the image as the request body).
#[derive(Clone)]
pub struct HostedClassifier {
    client: Client,
    cfg: Arc<HostedConfig>,
}

impl HostedClassifier {
    pub fn new(client: Client, cfg: HostedConfig) -> Self {
        Self {
            client,
            cfg: Arc::new(cfg),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[derive(Deserialize)]
struct HostedPrediction {
    label: String,
    score: f32,
}

#[derive(Deserialize)]
struct HostedError {
    error: String,
}

/// Parses the endpoint's `[{"label": .., "score": ..}]` body into ranked
/// classifications.
pub fn parse_predictions(body: &[u8]) -> Result<Vec<Classification>, ProviderError> {
    if let Ok(err) = serde_json::from_slice::<HostedError>(body) {
        return Err(ProviderError::RequestFailed(err.error));
    }
    let mut parsed: Vec<HostedPrediction> = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    parsed.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(parsed
        .into_iter()
        .map(|p| Classification {
            label: p.label,
            confidence: p.score.clamp(0.0, 1.0),
        })
        .collect())
}

fn encode_png(frame: &RgbImage) -> Result<Vec<u8>, ProviderError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(frame.as_raw(), frame.width(), frame.height(), ColorType::Rgb8)
        .map_err(|e| ProviderError::Encode(e.to_string()))?;
    Ok(buf)
}

#[async_trait::async_trait]
impl ImageClassifier for HostedClassifier {
    async fn classify(&self, frame: &RgbImage) -> Result<Vec<Classification>, ProviderError> {
        let body = Bytes::from(encode_png(frame)?);
        let mut req = self
            .client
            .post(self.endpoint())
            .header(CONTENT_TYPE, "image/png")
            .body(body);
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!(
                "{}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }
        parse_predictions(&bytes)
    }
}

/// Builds the HTTP client for a [`HostedClassifier`].
pub struct HostedLoader {
    cfg: HostedConfig,
}

impl HostedLoader {
    pub fn new(cfg: HostedConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for HostedLoader {
    async fn load(&self) -> Result<Arc<dyn ImageClassifier>, ProviderError> {
        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        debug!(model = %self.cfg.model, "hosted classifier ready");
        Ok(Arc::new(HostedClassifier::new(client, self.cfg.clone())))
    }
}
