//! Text label rendering
//!
//! Labels are rasterized with ab_glyph through imageproc. The font is
//! resolved once per session from the configured search paths; without a
//! usable font, labels are skipped when flattening.

use std::path::PathBuf;

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::domain::{TEXT_LINE_HEIGHT, TextAnnotation};

#[derive(Clone, Default)]
pub struct FontBook {
    font: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("available", &self.font.is_some())
            .finish()
    }
}

impl FontBook {
    /// Use the first font file under `paths` that parses
    pub fn load(paths: &[PathBuf]) -> Self {
        for path in paths {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match FontArc::try_from_vec(bytes) {
                Ok(font) => {
                    log::debug!("Using font {}", path.display());
                    return Self::with_font(font);
                }
                Err(e) => log::debug!("Skipping unparsable font {}: {}", path.display(), e),
            }
        }
        log::warn!("No usable font found; text labels will not be rendered");
        Self::default()
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Draw a text label onto `img`, with display coordinates multiplied by `scale`
    pub fn draw(&self, img: &mut RgbaImage, text: &TextAnnotation, scale: f32) {
        let Some(font) = &self.font else {
            return;
        };
        let size = text.font_size * scale;
        if size <= 0.0 || !size.is_finite() {
            return;
        }
        let color = Rgba(text.color.to_rgba_u8());
        let x = (text.position.x * scale).round() as i32;
        for (i, line) in text.content.lines().enumerate() {
            let y = ((text.position.y + i as f32 * text.font_size * TEXT_LINE_HEIGHT) * scale)
                .round() as i32;
            draw_text_mut(img, color, x, y, size, font, line);
        }
    }
}
