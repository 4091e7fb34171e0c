//! Raster photo annotation editor
//!
//! Load a photograph, draw freehand strokes, text labels, rectangles,
//! circles and arrows over it, crop it, and flatten the result to a PNG at
//! the photograph's natural resolution.

pub mod canvas;
pub mod config;
pub mod crop;
pub mod domain;
pub mod error;
pub mod export;
pub mod history;
pub mod render;
pub mod session;
pub mod tools;

pub use canvas::{BaseImage, CanvasSurface, load_base_image};
pub use config::{EditorConfig, ShapeColor};
pub use domain::{AnnotationKind, AnnotationObject, CropRegion, ObjectId, Point};
pub use error::{EditorError, Result};
pub use export::{ExportedImage, FileSink, SaveSink};
pub use history::HistoryManager;
pub use session::{EditorCommand, EditorSession, PointerEvent};
pub use tools::Tool;
