//! Base image type and loading

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::domain::fit_scale;
use crate::error::{EditorError, Result};

/// Background photograph with its display fitting
#[derive(Clone, Debug)]
pub struct BaseImage {
    pixels: Arc<RgbaImage>,
    display_scale: f64,
    source: String,
}

impl BaseImage {
    /// Wrap decoded pixels, fitting them into the `viewport`
    ///
    /// Transparent areas are composited onto white, matching the editor's
    /// canvas background, so the stored pixels are always opaque.
    pub fn from_rgba(mut rgba: RgbaImage, source: impl Into<String>, viewport: (u32, u32)) -> Self {
        flatten_onto_white(&mut rgba);
        let display_scale = fit_scale(rgba.width(), rgba.height(), viewport.0, viewport.1);
        let source = source.into();
        log::debug!(
            "BaseImage {}: {}x{} pixels, display scale {:.4}",
            source,
            rgba.width(),
            rgba.height(),
            display_scale
        );
        Self {
            pixels: Arc::new(rgba),
            display_scale,
            source,
        }
    }

    /// Decode an encoded image (any format the image crate reads)
    pub fn decode(bytes: &[u8], source: &str, viewport: (u32, u32)) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|e| EditorError::image_load(source, e))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(EditorError::image_load(source, "image has no pixels"));
        }
        Ok(Self::from_rgba(decoded.to_rgba8(), source, viewport))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the natural width of the image
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Get the natural height of the image
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Display pixels per natural pixel
    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    /// Exact (fractional) display width
    pub fn display_width(&self) -> f64 {
        f64::from(self.width()) * self.display_scale
    }

    /// Exact (fractional) display height
    pub fn display_height(&self) -> f64 {
        f64::from(self.height()) * self.display_scale
    }

    /// Display size rounded to whole pixels
    pub fn display_size(&self) -> (u32, u32) {
        (
            (self.display_width().round() as u32).max(1),
            (self.display_height().round() as u32).max(1),
        )
    }
}

fn flatten_onto_white(img: &mut RgbaImage) {
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        if a == 255 {
            continue;
        }
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *pixel = Rgba([blend(r), blend(g), blend(b), 255]);
    }
}

/// Fetch and decode the image behind `locator`
///
/// Accepts `http://` / `https://` URLs, `file://` URLs and plain paths.
/// Decoding runs on the blocking pool.
pub async fn load_base_image(locator: &str, viewport: (u32, u32)) -> Result<BaseImage> {
    log::info!("Loading base image from {}", locator);
    let bytes = fetch(locator).await?;
    let source = locator.to_string();
    tokio::task::spawn_blocking(move || BaseImage::decode(&bytes, &source, viewport))
        .await
        .map_err(|e| EditorError::image_load(locator, e))?
}

async fn fetch(locator: &str) -> Result<Vec<u8>> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        let response = reqwest::get(locator)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EditorError::image_load(locator, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EditorError::image_load(locator, e))?;
        return Ok(bytes.to_vec());
    }

    let path = locator.strip_prefix("file://").unwrap_or(locator);
    tokio::fs::read(path)
        .await
        .map_err(|e| EditorError::image_load(locator, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_preserves_aspect() {
        let base = BaseImage::from_rgba(RgbaImage::new(1200, 800), "mem", (800, 600));
        assert_eq!(base.display_size(), (800, 533));
        assert!((base.display_width() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let base = BaseImage::from_rgba(img, "mem", (800, 600));
        assert_eq!(base.pixels().get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_decode_garbage_is_load_error() {
        let err = BaseImage::decode(b"not an image", "junk.bin", (800, 600)).unwrap_err();
        assert!(matches!(err, EditorError::ImageLoad { ref locator, .. } if locator == "junk.bin"));
    }

    #[tokio::test]
    async fn test_load_from_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255])).save(&path).unwrap();

        let locator = path.to_string_lossy().to_string();
        let base = load_base_image(&locator, (800, 600)).await.unwrap();
        assert_eq!((base.width(), base.height()), (40, 20));
        assert_eq!(base.display_size(), (800, 400));

        let url = format!("file://{}", locator);
        let again = load_base_image(&url, (800, 600)).await.unwrap();
        assert_eq!(again.pixels().get_pixel(3, 3), &Rgba([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let err = load_base_image("/definitely/not/here.jpg", (800, 600)).await.unwrap_err();
        assert!(matches!(err, EditorError::ImageLoad { .. }));
    }
}
