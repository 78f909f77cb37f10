use cli::report::scan_file;
use freshness_core::config::AppConfig;
use freshness_core::pipeline::build_detector_with;
use freshness_core::session::{ScanSession, ScanState};
use freshness_core::Prediction;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use providers::{
    Classification, ClassifierLoader, ClassifierRegistry, ImageClassifier, ProviderError,
};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

struct Produce {
    loads: Arc<AtomicUsize>,
}

struct ProduceModel;

#[async_trait::async_trait]
impl ImageClassifier for ProduceModel {
    async fn classify(&self, _frame: &RgbImage) -> Result<Vec<Classification>, ProviderError> {
        Ok(vec![Classification {
            label: "Granny Smith".to_string(),
            confidence: 0.77,
        }])
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for Produce {
    async fn load(&self) -> Result<Arc<dyn ImageClassifier>, ProviderError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ProduceModel))
    }
}

fn write_image(path: &Path, color: [u8; 3], width: u32, height: u32, format: ImageOutputFormat) {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    fs::write(path, out.into_inner()).unwrap();
}

#[tokio::test]
async fn test_scan_files_end_to_end() {
    let temp = tempdir().unwrap();
    let black = temp.path().join("bruised.png");
    let green = temp.path().join("lettuce.png");
    let photo = temp.path().join("apple.jpg");
    let gif = temp.path().join("apple.gif");
    let broken = temp.path().join("broken.webp");

    write_image(&black, [0, 0, 0], 640, 480, ImageOutputFormat::Png);
    write_image(&green, [0, 200, 0], 100, 300, ImageOutputFormat::Png);
    write_image(&photo, [90, 90, 90], 64, 64, ImageOutputFormat::Jpeg(90));
    fs::write(&gif, b"GIF89a....").unwrap();
    fs::write(&broken, b"RIFF\x00\x00\x00\x00WEBPVP8 garbage").unwrap();

    let loads = Arc::new(AtomicUsize::new(0));
    let registry = ClassifierRegistry::new()
        .with_loader(
            "produce-end-to-end",
            Arc::new(Produce {
                loads: loads.clone(),
            }),
        )
        .set_preferred("produce-end-to-end");
    let detector = build_detector_with(&AppConfig::default(), &registry).unwrap();
    let mut session = ScanSession::new();

    let r = scan_file(&detector, &mut session, &black, None).await;
    let v = r.verdict.expect("black frame verdict");
    assert_eq!(v.prediction, Prediction::Spoiled);
    assert_eq!(v.confidence, 0.94);
    assert_eq!(v.details, "Detected: Granny Smith - Poor quality indicators found");

    let r = scan_file(&detector, &mut session, &green, None).await;
    let v = r.verdict.expect("green frame verdict");
    assert_eq!(v.prediction, Prediction::Fresh);
    assert!(matches!(session.state(), ScanState::Result(_)));

    // Dark gray stays neutral even with JPEG noise.
    let r = scan_file(&detector, &mut session, &photo, None).await;
    assert_eq!(r.verdict.expect("jpeg verdict").prediction, Prediction::Doubtful);

    let r = scan_file(&detector, &mut session, &gif, None).await;
    assert!(!r.is_ok());
    assert!(r.error.unwrap().contains("image/gif"));
    assert!(matches!(session.state(), ScanState::Error(_)));

    let r = scan_file(&detector, &mut session, &broken, None).await;
    assert!(r.error.unwrap().starts_with("could not decode image"));

    let r = scan_file(&detector, &mut session, &temp.path().join("missing.png"), None).await;
    assert_eq!(r.status, "error");

    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mime_override_is_checked_before_decode() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("leaf.png");
    write_image(&path, [0, 200, 0], 32, 32, ImageOutputFormat::Png);

    let registry = ClassifierRegistry::new()
        .with_loader(
            "produce-mime-override",
            Arc::new(Produce {
                loads: Arc::new(AtomicUsize::new(0)),
            }),
        )
        .set_preferred("produce-mime-override");
    let detector = build_detector_with(&AppConfig::default(), &registry).unwrap();
    let mut session = ScanSession::new();

    let r = scan_file(&detector, &mut session, &path, Some("image/gif")).await;
    assert!(!r.is_ok());
    let r = scan_file(&detector, &mut session, &path, Some("image/webp")).await;
    assert!(r.is_ok());
}
