//! Flattened PNG export
//!
//! The output is never smaller than the base image's natural resolution:
//! the display-space composite is scaled by `export_multiplier`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::canvas::{BaseImage, render_objects};
use crate::domain::AnnotationObject;
use crate::error::{EditorError, Result};
use crate::render::text::FontBook;

/// Encoded export plus the name it would like to be saved under
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filename_hint: String,
}

/// `max(natural_w / display_w, natural_h / display_h, 1)`
pub fn multiplier_for(natural: (u32, u32), display: (f64, f64)) -> f64 {
    let (dw, dh) = display;
    if !(dw > 0.0 && dh > 0.0) {
        return 1.0;
    }
    let mx = f64::from(natural.0) / dw;
    let my = f64::from(natural.1) / dh;
    mx.max(my).max(1.0)
}

pub fn export_multiplier(base: &BaseImage) -> f64 {
    multiplier_for(
        (base.width(), base.height()),
        (base.display_width(), base.display_height()),
    )
}

/// Output dimensions for `base`
pub fn export_size(base: &BaseImage) -> (u32, u32) {
    let m = export_multiplier(base);
    (
        (base.display_width() * m).round() as u32,
        (base.display_height() * m).round() as u32,
    )
}

/// Chrono-stamped default file name
pub fn filename_hint() -> String {
    chrono::Local::now()
        .format("Annotated_%Y-%m-%d_%H-%M-%S.png")
        .to_string()
}

/// Composite and encode. Pure with respect to its inputs.
pub fn export_image(
    base: &BaseImage,
    objects: &[AnnotationObject],
    fonts: &FontBook,
) -> Result<ExportedImage> {
    let multiplier = export_multiplier(base);
    let image = render_objects(base, objects, multiplier, fonts);
    let png = encode_png(&image)?;
    log::info!(
        "Exported {}x{} PNG ({} objects, multiplier {:.3}, {} bytes)",
        image.width(),
        image.height(),
        objects.len(),
        multiplier,
        png.len()
    );
    Ok(ExportedImage {
        png,
        width: image.width(),
        height: image.height(),
        filename_hint: filename_hint(),
    })
}

/// `export_image` on the blocking pool over owned copies of the state
pub async fn export_image_async(
    base: BaseImage,
    objects: Vec<AnnotationObject>,
    fonts: FontBook,
) -> Result<ExportedImage> {
    tokio::task::spawn_blocking(move || export_image(&base, &objects, &fonts))
        .await
        .map_err(|e| EditorError::Export(e.to_string()))?
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, image).map_err(|e| EditorError::Export(e.to_string()))?;
    Ok(buffer)
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Destination for a finished export
pub trait SaveSink {
    fn save(&mut self, image: ExportedImage) -> anyhow::Result<()>;
}

impl<F: FnMut(ExportedImage)> SaveSink for F {
    fn save(&mut self, image: ExportedImage) -> anyhow::Result<()> {
        self(image);
        Ok(())
    }
}

/// Writes exports into a directory under their hinted names
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Sink for the user's Pictures folder
    pub fn pictures() -> Option<Self> {
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            .map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl SaveSink for FileSink {
    fn save(&mut self, image: ExportedImage) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let mut file = tempfile::Builder::new()
            .prefix("annotated-")
            .suffix(".png")
            .tempfile_in(&self.dir)?;
        file.write_all(&image.png)?;
        file.flush()?;

        let target = self.dir.join(&image.filename_hint);
        let path = if target.exists() {
            // Same-second export: keep the temp name instead of clobbering
            let (_, path) = file.keep()?;
            path
        } else {
            file.persist(&target)?;
            target
        };
        log::info!("Saved export to {}", path.display());
        self.saved.push(path);
        Ok(())
    }
}
