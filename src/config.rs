//! Configuration persistence for editor settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serializable color representation for config storage and annotations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl ShapeColor {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse a `#rrggbb` (or `rrggbb`) hex string
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }
}

/// Editor configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Display viewport the base image is fitted into
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Stroke/fill color for new annotations
    pub color: ShapeColor,
    /// Freehand brush width in display pixels
    pub brush_size: f32,
    /// Stroke width for rectangles and circles
    pub shape_stroke_width: f32,
    /// Stroke width for arrows
    pub arrow_stroke_width: f32,
    pub font_size: f32,
    pub font_family: String,
    /// Content of a freshly placed text label
    pub placeholder_text: String,
    /// Where toolbar-created text and shapes are placed
    pub default_position: (f32, f32),
    pub default_rect_size: (f32, f32),
    pub default_circle_radius: f32,
    /// Extra slack around object bounds when hit testing
    pub hit_tolerance: f32,
    /// Half-size of the crop region's resize handles
    pub crop_handle_size: f32,
    /// Font files tried in order when rendering text labels
    pub font_paths: Vec<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            color: ShapeColor::BLACK,
            brush_size: 5.0,
            shape_stroke_width: 2.0,
            arrow_stroke_width: 3.0,
            font_size: 20.0,
            font_family: "Arial".to_string(),
            placeholder_text: "Double click to edit".to_string(),
            default_position: (100.0, 100.0),
            default_rect_size: (100.0, 100.0),
            default_circle_radius: 50.0,
            hit_tolerance: 4.0,
            crop_handle_size: 10.0,
            font_paths: default_font_paths(),
        }
    }
}

fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl EditorConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "photo-annotator";

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert_eq!(ShapeColor::from_hex("#000000"), Some(ShapeColor::BLACK));
        let red = ShapeColor::from_hex("ff0000").unwrap();
        assert_eq!(red.to_rgba_u8(), [255, 0, 0, 255]);
        assert_eq!(ShapeColor::from_hex("#12345"), None);
        assert_eq!(ShapeColor::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_defaults_match_editor_canvas() {
        let config = EditorConfig::default();
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert_eq!(config.brush_size, 5.0);
        assert_eq!(config.font_size, 20.0);
        assert_eq!(config.default_position, (100.0, 100.0));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"brush_size": 9.0}"#).unwrap();
        assert_eq!(config.brush_size, 9.0);
        assert_eq!(config.viewport_width, 800);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = EditorConfig {
            font_size: 32.0,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EditorConfig::load_from(&path).unwrap(), config);
    }
}
