//! Editor session state
//!
//! `EditorSession` owns the canvas, the history and the tool controller and
//! is the only place where tool mutations are applied and committed.

use crate::canvas::{BaseImage, CanvasSurface, load_base_image};
use crate::config::{EditorConfig, ShapeColor};
use crate::crop;
use crate::domain::{AnnotationKind, AnnotationObject, CropRegion, IdAllocator, ObjectId, Point};
use crate::error::{EditorError, Result};
use crate::export::{self, ExportedImage, SaveSink};
use crate::history::HistoryManager;
use crate::render::text::FontBook;
use crate::session::messages::{EditorCommand, PointerEvent};
use crate::tools::{Mutation, Tool, ToolContext, ToolController, ToolStyle};

/// Brush width slider range
pub const BRUSH_SIZE_RANGE: (f32, f32) = (1.0, 20.0);
/// Font size input range
pub const FONT_SIZE_RANGE: (f32, f32) = (8.0, 72.0);

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    canvas: CanvasSurface,
    history: HistoryManager,
    tools: ToolController,
    style: ToolStyle,
    ids: IdAllocator,
    fonts: FontBook,
    /// A text edit has changed the canvas but not yet been committed
    pending_text: bool,
}

impl EditorSession {
    /// Load `locator` and start editing it
    pub async fn open(locator: &str, config: EditorConfig) -> Result<Self> {
        let viewport = (config.viewport_width, config.viewport_height);
        let base = load_base_image(locator, viewport).await?;
        Ok(Self::new(base, config))
    }

    pub fn new(base: BaseImage, config: EditorConfig) -> Self {
        let fonts = FontBook::load(&config.font_paths);
        Self::with_fonts(base, config, fonts)
    }

    pub fn with_fonts(base: BaseImage, config: EditorConfig, fonts: FontBook) -> Self {
        log::info!(
            "Editing {} ({}x{}, display {}x{})",
            base.source(),
            base.width(),
            base.height(),
            base.display_size().0,
            base.display_size().1
        );
        Self {
            style: ToolStyle::from_config(&config),
            config,
            canvas: CanvasSurface::new(base),
            history: HistoryManager::new(),
            tools: ToolController::new(),
            ids: IdAllocator::default(),
            fonts,
            pending_text: false,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasSurface {
        &self.canvas
    }

    pub fn base(&self) -> &BaseImage {
        self.canvas.base()
    }

    pub fn objects(&self) -> &[AnnotationObject] {
        self.canvas.objects()
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.canvas.selected()
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.tools.crop_region()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    fn viewport(&self) -> (u32, u32) {
        (self.config.viewport_width, self.config.viewport_height)
    }

    fn default_position(&self) -> Point {
        let (x, y) = self.config.default_position;
        Point::new(x, y)
    }

    // ------------------------------------------------------------------------
    // Tools and pointer input
    // ------------------------------------------------------------------------

    /// Activate `tool`, discarding any half-finished gesture
    pub fn set_tool(&mut self, tool: Tool) {
        self.commit_text_edit();
        let mutations = self.tools.set_tool(tool, self.canvas.size());
        self.apply(mutations);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if matches!(event, PointerEvent::Down(_)) {
            self.commit_text_edit();
        }
        let ctx = ToolContext {
            canvas: &self.canvas,
            style: &self.style,
            ids: &mut self.ids,
            hit_tolerance: self.config.hit_tolerance,
            crop_handle_size: self.config.crop_handle_size,
        };
        let mutations = self.tools.handle(event, ctx);
        self.apply(mutations);
    }

    fn cancel_gesture(&mut self) {
        let mutations = self.tools.cancel_gesture();
        self.apply(mutations);
    }

    fn apply(&mut self, mutations: Vec<Mutation>) {
        for mutation in mutations {
            match mutation {
                Mutation::Append(object) => {
                    self.canvas.push(object);
                    self.history.commit(self.canvas.objects());
                }
                Mutation::Preview(object) => self.canvas.upsert(object),
                Mutation::ExtendPath { id, point } => {
                    if let Some(AnnotationObject {
                        kind: AnnotationKind::FreehandPath(path),
                        ..
                    }) = self.canvas.get_mut(id)
                    {
                        path.points.push(point);
                    }
                }
                Mutation::Translate { id, dx, dy } => {
                    if let Some(object) = self.canvas.get_mut(id) {
                        let mut moved = object.clone();
                        moved.translate(dx, dy);
                        let b = moved.bounds();
                        if [b.left, b.top, b.right, b.bottom].iter().all(|v| v.is_finite()) {
                            *object = moved;
                        } else {
                            log::warn!("Ignoring move of object {} out of range", id);
                        }
                    }
                }
                Mutation::Commit => self.history.commit(self.canvas.objects()),
                Mutation::Discard => {
                    if let Some(objects) = self.history.current() {
                        self.canvas.set_objects(objects);
                    }
                }
                Mutation::Select(id) => self.canvas.select(id),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------------

    /// Color for objects created from now on
    pub fn set_color(&mut self, color: ShapeColor) {
        self.style.color = color;
    }

    pub fn set_brush_size(&mut self, size: f32) {
        if size.is_finite() {
            self.style.brush_size = size.clamp(BRUSH_SIZE_RANGE.0, BRUSH_SIZE_RANGE.1);
        }
    }

    pub fn set_font_size(&mut self, size: f32) {
        if size.is_finite() {
            self.style.font_size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
        }
    }

    // ------------------------------------------------------------------------
    // Object mutations
    // ------------------------------------------------------------------------

    /// Toolbar "Add Text": placeholder label at the default position
    pub fn add_text(&mut self) -> ObjectId {
        let id = self.ids.next_id();
        let object = self.style.text_at(id, self.default_position());
        self.add_and_select(object)
    }

    pub fn add_rectangle(&mut self) -> ObjectId {
        let id = self.ids.next_id();
        let object = self.style.rectangle_at(id, self.default_position());
        self.add_and_select(object)
    }

    pub fn add_circle(&mut self) -> ObjectId {
        let id = self.ids.next_id();
        let object = self.style.circle_at(id, self.default_position());
        self.add_and_select(object)
    }

    fn add_and_select(&mut self, object: AnnotationObject) -> ObjectId {
        let id = object.id;
        if self.add_object(object) {
            self.canvas.select(Some(id));
        }
        id
    }

    /// Append on top and commit. An id already on the canvas is rejected
    /// without any change.
    pub fn add_object(&mut self, object: AnnotationObject) -> bool {
        if self.canvas.get(object.id).is_some() {
            log::warn!("Rejecting object with duplicate id {}", object.id);
            return false;
        }
        self.commit_text_edit();
        self.cancel_gesture();
        self.ids.reserve(object.id);
        self.canvas.push(object);
        self.history.commit(self.canvas.objects());
        true
    }

    /// Remove and commit; absent ids are a no-op without a commit
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        self.commit_text_edit();
        self.cancel_gesture();
        if self.canvas.remove(id).is_none() {
            return false;
        }
        self.history.commit(self.canvas.objects());
        true
    }

    /// Swap the object with the same id without committing
    pub fn replace_object(&mut self, object: AnnotationObject) -> bool {
        match self.canvas.get_mut(object.id) {
            Some(slot) => {
                *slot = object;
                true
            }
            None => false,
        }
    }

    /// Final replacement of a gesture: replace and commit once
    pub fn commit_replace(&mut self, object: AnnotationObject) -> bool {
        if !self.replace_object(object) {
            return false;
        }
        self.pending_text = false;
        self.history.commit(self.canvas.objects());
        true
    }

    /// Toolbar trash button
    pub fn delete_selected(&mut self) -> bool {
        match self.canvas.selected() {
            Some(id) => self.remove_object(id),
            None => false,
        }
    }

    /// Remove every object in one commit
    pub fn clear_annotations(&mut self) {
        self.commit_text_edit();
        self.cancel_gesture();
        if self.canvas.objects().is_empty() {
            return;
        }
        self.canvas.set_objects(Vec::new());
        self.history.commit(self.canvas.objects());
    }

    /// Change a text label's content. Edits are coalesced until
    /// `commit_text_edit` or the next committing action.
    pub fn edit_text(&mut self, id: ObjectId, content: impl Into<String>) -> bool {
        self.cancel_gesture();
        let content = content.into();
        let Some(AnnotationObject {
            kind: AnnotationKind::TextLabel(text),
            ..
        }) = self.canvas.get_mut(id)
        else {
            return false;
        };
        if text.content != content {
            text.content = content;
            self.pending_text = true;
        }
        true
    }

    /// Commit a pending text edit; `false` if there was none
    pub fn commit_text_edit(&mut self) -> bool {
        if !std::mem::take(&mut self.pending_text) {
            return false;
        }
        self.history.commit(self.canvas.objects());
        true
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.pending_text || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.pending_text && self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.commit_text_edit();
        self.cancel_gesture();
        match self.history.undo() {
            Some(objects) => {
                self.canvas.set_objects(objects);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.commit_text_edit();
        self.cancel_gesture();
        match self.history.redo() {
            Some(objects) => {
                self.canvas.set_objects(objects);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------------

    /// Reposition the crop region; `false` unless the crop tool is active
    pub fn set_crop_region(&mut self, region: CropRegion) -> bool {
        self.tools.set_crop_region(region)
    }

    /// Bake the crop into a new base image. Objects and history are cleared
    /// and the select tool is restored. On error nothing changes.
    pub fn apply_crop(&mut self) -> Result<()> {
        let region = self.tools.crop_region().ok_or(EditorError::CropInactive)?;
        let base = crop::apply_crop(&self.canvas, region, &self.fonts, self.viewport())?;
        log::info!(
            "Crop applied: new base image {}x{}",
            base.width(),
            base.height()
        );
        self.canvas = CanvasSurface::new(base);
        self.history.reset();
        self.tools.reset();
        self.pending_text = false;
        Ok(())
    }

    /// Leave the crop tool without changing anything
    pub fn cancel_crop(&mut self) {
        if self.tools.tool() == Tool::Crop {
            self.set_tool(Tool::Select);
        }
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// Objects that belong in an export: everything but an in-progress preview
    fn export_objects(&self) -> Vec<AnnotationObject> {
        let preview = self.tools.preview_id();
        self.canvas
            .objects()
            .iter()
            .filter(|o| Some(o.id) != preview)
            .cloned()
            .collect()
    }

    /// Flatten to a PNG at no less than the base image's natural resolution
    pub fn export_flattened(&self) -> Result<ExportedImage> {
        export::export_image(self.canvas.base(), &self.export_objects(), &self.fonts)
    }

    /// `export_flattened` with rendering and encoding on the blocking pool
    pub async fn export_flattened_async(&self) -> Result<ExportedImage> {
        let base = self.canvas.base().clone();
        let objects = self.export_objects();
        let fonts = self.fonts.clone();
        export::export_image_async(base, objects, fonts).await
    }

    /// Export and hand the result to `sink`
    pub fn save<S: SaveSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let image = self.export_flattened()?;
        sink.save(image)
            .map_err(|e| EditorError::Export(format!("{:#}", e)))
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Run one user-level command. Only crop and save can fail.
    pub fn dispatch<S: SaveSink + ?Sized>(&mut self, command: EditorCommand, sink: &mut S) -> Result<()> {
        if let Some(event) = command.pointer_event() {
            self.handle_pointer(event);
            return Ok(());
        }
        if let Some(region) = command.crop_region() {
            if !self.set_crop_region(region) {
                log::warn!("Ignoring crop region while {:?} is active", self.tool());
            }
            return Ok(());
        }
        match command {
            EditorCommand::SetTool { tool } => self.set_tool(tool),
            EditorCommand::AddText => {
                self.add_text();
            }
            EditorCommand::AddRectangle => {
                self.add_rectangle();
            }
            EditorCommand::AddCircle => {
                self.add_circle();
            }
            EditorCommand::EditText { content } => {
                let edited = match self.selected() {
                    Some(id) => self.edit_text(id, content),
                    None => false,
                };
                if !edited {
                    log::warn!("No text label selected to edit");
                }
            }
            EditorCommand::CommitText => {
                self.commit_text_edit();
            }
            EditorCommand::SetColor { color } => match ShapeColor::from_hex(&color) {
                Some(c) => self.set_color(c),
                None => log::warn!("Ignoring invalid color {:?}", color),
            },
            EditorCommand::SetBrushSize { size } => self.set_brush_size(size),
            EditorCommand::SetFontSize { size } => self.set_font_size(size),
            EditorCommand::DeleteSelected => {
                self.delete_selected();
            }
            EditorCommand::ClearAnnotations => self.clear_annotations(),
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
            EditorCommand::ApplyCrop => self.apply_crop()?,
            EditorCommand::CancelCrop => self.cancel_crop(),
            EditorCommand::Save => self.save(sink)?,
            EditorCommand::PointerDown { .. }
            | EditorCommand::PointerMove { .. }
            | EditorCommand::PointerUp { .. }
            | EditorCommand::SetCropRegion { .. } => {}
        }
        Ok(())
    }
}
