use crate::media;
use chrono::{DateTime, Utc};
use freshness_core::session::ScanSession;
use freshness_core::{FreshnessDetector, FreshnessVerdict};
use serde::Serialize;
use std::path::Path;

/// Outcome of scanning one file, as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub path: String,
    pub status: &'static str,
    pub scanned_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<FreshnessVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanReport {
    pub fn ok(path: &Path, verdict: FreshnessVerdict) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            status: "ok",
            scanned_at: Utc::now(),
            verdict: Some(verdict),
            error: None,
        }
    }

    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            status: "error",
            scanned_at: Utc::now(),
            verdict: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.verdict.is_some()
    }

    pub fn render_text(&self) -> String {
        match (&self.verdict, &self.error) {
            (Some(v), _) => format!("{}: {}", self.path, v),
            (None, Some(e)) => format!("{}: error: {}", self.path, e),
            (None, None) => format!("{}: no result", self.path),
        }
    }
}

/// Reads and scans one file through the session.
pub async fn scan_file(
    detector: &FreshnessDetector,
    session: &mut ScanSession,
    path: &Path,
    explicit_mime: Option<&str>,
) -> ScanReport {
    let source = match media::read_source(path, explicit_mime) {
        Ok(s) => s,
        Err(e) => return ScanReport::failed(path, format!("{:#}", e)),
    };
    match session.scan(detector, source).await {
        Ok(verdict) => ScanReport::ok(path, verdict),
        Err(e) => ScanReport::failed(path, e.to_string()),
    }
}
