//! Error kinds surfaced by the editor

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The source image could not be fetched or decoded; the editor does not open
    #[error("cannot edit this image ({locator}): {reason}")]
    ImageLoad { locator: String, reason: String },

    /// The crop rectangle is empty after clamping to the canvas
    #[error("invalid crop region ({width}x{height} after clamping)")]
    InvalidCropRegion { width: f32, height: f32 },

    /// Apply-crop was requested while no crop region exists
    #[error("no crop region is active")]
    CropInactive,

    /// Rendering or encoding the flattened image failed; safe to retry
    #[error("export failed: {0}")]
    Export(String),
}

impl EditorError {
    pub(crate) fn image_load(locator: &str, reason: impl std::fmt::Display) -> Self {
        Self::ImageLoad {
            locator: locator.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience result alias
pub type Result<T, E = EditorError> = std::result::Result<T, E>;
