//! Validation and decoding of user-supplied images into fixed-size frames.

use crate::error::ScanError;
use crate::models::SourceImage;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba};
use tracing::{debug, warn};

/// Side length of every decoded frame.
pub const FRAME_SIZE: u32 = 224;
/// Largest accepted source image.
pub const MAX_SOURCE_BYTES: u64 = 5 * 1024 * 1024;
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// A `FRAME_SIZE`×`FRAME_SIZE` RGB pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pixels: RgbImage,
}

impl DecodedFrame {
    pub fn from_rgb(pixels: RgbImage) -> Result<Self, ScanError> {
        if pixels.dimensions() != (FRAME_SIZE, FRAME_SIZE) {
            return Err(ScanError::InvalidInput(format!(
                "frame must be {}x{}, got {}x{}",
                FRAME_SIZE,
                FRAME_SIZE,
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    /// A frame where every pixel has the same color.
    pub fn filled(rgb: [u8; 3]) -> Self {
        Self {
            pixels: RgbImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgb(rgb)),
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Rejects sources with an unsupported type or above the size ceiling.
pub fn validate(source: &SourceImage) -> Result<(), ScanError> {
    let mime = essence(&source.mime);
    if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        warn!(mime = %source.mime, "rejected image type");
        return Err(ScanError::InvalidInput(format!(
            "unsupported image type '{}': expected JPEG, PNG or WebP",
            source.mime
        )));
    }
    let size = source.size.max(source.bytes.len() as u64);
    if size > MAX_SOURCE_BYTES {
        warn!(size, "rejected oversized image");
        return Err(ScanError::InvalidInput(format!(
            "image is {} bytes; the limit is 5 MiB",
            size
        )));
    }
    Ok(())
}

/// Validates and decodes a source into a frame, stretching it to
/// `FRAME_SIZE`×`FRAME_SIZE` without preserving aspect ratio.
pub fn decode(source: &SourceImage) -> Result<DecodedFrame, ScanError> {
    validate(source)?;
    let img =
        image::load_from_memory(&source.bytes).map_err(|e| ScanError::Decode(e.to_string()))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "decoded source image"
    );
    Ok(DecodedFrame {
        pixels: draw_on_blank_canvas(&img),
    })
}

fn premultiply(px: &mut Rgba<u8>) {
    let a = px[3] as u16;
    for c in px.0.iter_mut().take(3) {
        *c = ((*c as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply(px: Rgba<u8>) -> Rgb<u8> {
    let a = px[3] as u16;
    if a == 0 {
        return Rgb([0, 0, 0]);
    }
    let channel = |c: u8| ((c as u16 * 255 + a / 2) / a).min(255) as u8;
    Rgb([channel(px[0]), channel(px[1]), channel(px[2])])
}

/// Scales the image onto a transparent black frame and reads back its color
/// channels. Resampling happens on premultiplied pixels, so fully transparent
/// areas come out black and opaque images are unaffected.
fn draw_on_blank_canvas(img: &DynamicImage) -> RgbImage {
    let mut rgba = img.to_rgba8();
    rgba.pixels_mut().for_each(premultiply);
    let scaled = imageops::resize(&rgba, FRAME_SIZE, FRAME_SIZE, FilterType::Triangle);
    RgbImage::from_fn(FRAME_SIZE, FRAME_SIZE, |x, y| {
        unpremultiply(*scaled.get_pixel(x, y))
    })
}

/// Async form of [`decode`]; the decode itself runs on the blocking pool.
pub async fn normalize(source: SourceImage) -> Result<DecodedFrame, ScanError> {
    validate(&source)?;
    tokio::task::spawn_blocking(move || decode(&source))
        .await
        .map_err(|e| ScanError::Decode(e.to_string()))?
}
