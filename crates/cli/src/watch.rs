use crate::media;
use crate::report::{self, ScanReport};
use anyhow::Result;
use freshness_core::config::AppConfig;
use freshness_core::session::ScanSession;
use freshness_core::FreshnessDetector;
use notify::event::{EventKind, ModifyKind};
use notify::{Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Image files touched by a create or content-modify event.
pub fn scan_targets(event: &Event) -> Vec<PathBuf> {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(_))
    );
    if !relevant {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|p| p.is_file() && media::mime_from_extension(p).is_some())
        .cloned()
        .collect()
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Scans images named by watch events, skipping files whose modification
/// time has not changed since they were last scanned.
#[derive(Default)]
pub struct ImageWatch {
    session: ScanSession,
    seen: HashMap<PathBuf, SystemTime>,
}

impl ImageWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently remembered as scanned.
    pub fn tracked(&self) -> usize {
        self.seen.len()
    }

    pub async fn handle(&mut self, detector: &FreshnessDetector, event: &Event) -> Vec<ScanReport> {
        // Removed or renamed-away files.
        for path in &event.paths {
            if !path.exists() {
                self.seen.remove(path);
            }
        }

        let mut reports = Vec::new();
        for path in scan_targets(event) {
            let stamp = modified_at(&path);
            if stamp.is_some() && self.seen.get(&path) == stamp.as_ref() {
                continue;
            }
            reports.push(report::scan_file(detector, &mut self.session, &path, None).await);
            if let Some(t) = stamp {
                self.seen.insert(path, t);
            }
        }
        reports
    }
}

/// Watches `dir` and scans each new or changed image until `shutdown`
/// completes. With `watch.poll_interval_ms` set the folder is polled,
/// otherwise the platform's native notifications are used.
pub async fn watch_dir(
    cfg: &AppConfig,
    detector: &FreshnessDetector,
    dir: &Path,
    emit: impl Fn(&ScanReport),
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let handler = move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    };
    let mut watcher: Box<dyn Watcher> = match cfg.watch.poll_interval_ms {
        Some(ms) => Box::new(PollWatcher::new(
            handler,
            notify::Config::default().with_poll_interval(Duration::from_millis(ms)),
        )?),
        None => Box::new(RecommendedWatcher::new(handler, notify::Config::default())?),
    };
    watcher.watch(dir, RecursiveMode::Recursive)?;
    info!(dir = %dir.display(), "watching for images");

    let mut images = ImageWatch::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("stopping watch");
                return Ok(());
            }
            msg = rx.recv() => {
                let Some(res) = msg else { return Ok(()) };
                match res {
                    Ok(event) => {
                        for report in images.handle(detector, &event).await {
                            emit(&report);
                        }
                    }
                    Err(e) => warn!(error = %e, "watch error"),
                }
            }
        }
    }
}
