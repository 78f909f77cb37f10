use anyhow::{Context, Result};
use freshness_core::normalizer::MAX_SOURCE_BYTES;
use freshness_core::SourceImage;
use std::fs;
use std::path::Path;

/// Declared type for a file name, the way a browser would report it.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

/// Explicit override, then extension, then content sniffing.
pub fn resolve_mime(path: &Path, head: &[u8], explicit: Option<&str>) -> String {
    if let Some(m) = explicit {
        return m.to_string();
    }
    if let Some(m) = mime_from_extension(path) {
        return m.to_string();
    }
    infer::get(head)
        .map(|t| t.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Reads a file into a [`SourceImage`]. Files over the size ceiling are not
/// read; their declared size alone gets them rejected.
pub fn read_source(path: &Path, explicit_mime: Option<&str>) -> Result<SourceImage> {
    let size = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    let bytes = if size > MAX_SOURCE_BYTES {
        Vec::new()
    } else {
        fs::read(path).with_context(|| format!("read {}", path.display()))?
    };
    let mime = resolve_mime(path, &bytes, explicit_mime);
    Ok(SourceImage { bytes, mime, size })
}
