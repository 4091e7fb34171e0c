//! Tool state machine
//!
//! `ToolController` owns the active tool, the in-progress gesture and the
//! transient crop region. It turns pointer events into `Mutation`s; it never
//! edits the canvas or the history itself.

pub mod handlers;

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasSurface;
use crate::config::{EditorConfig, ShapeColor};
use crate::domain::{AnnotationObject, CropRegion, DragState, IdAllocator, ObjectId, Point};
use crate::session::messages::PointerEvent;

/// Exactly one of these is active at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Select,
    Draw,
    Text,
    Rectangle,
    Circle,
    Arrow,
    Crop,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Select,
        Tool::Draw,
        Tool::Text,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Arrow,
        Tool::Crop,
    ];
}

/// Canvas change requested by a tool
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append a finished object and commit
    Append(AnnotationObject),
    /// Insert or replace an uncommitted object
    Preview(AnnotationObject),
    /// Add a point to an uncommitted freehand path
    ExtendPath { id: ObjectId, point: Point },
    /// Move an object without committing
    Translate { id: ObjectId, dx: f32, dy: f32 },
    /// Commit the live object list as one history entry
    Commit,
    /// Throw away every uncommitted change
    Discard,
    /// Change the selection
    Select(Option<ObjectId>),
}

/// Appearance applied to newly created objects
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStyle {
    pub color: ShapeColor,
    pub brush_size: f32,
    pub shape_stroke_width: f32,
    pub arrow_stroke_width: f32,
    pub font_size: f32,
    pub font_family: String,
    pub placeholder_text: String,
    pub default_rect_size: (f32, f32),
    pub default_circle_radius: f32,
}

impl ToolStyle {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            color: config.color,
            brush_size: config.brush_size,
            shape_stroke_width: config.shape_stroke_width,
            arrow_stroke_width: config.arrow_stroke_width,
            font_size: config.font_size,
            font_family: config.font_family.clone(),
            placeholder_text: config.placeholder_text.clone(),
            default_rect_size: config.default_rect_size,
            default_circle_radius: config.default_circle_radius,
        }
    }

    pub fn text_at(&self, id: ObjectId, position: Point) -> AnnotationObject {
        AnnotationObject::text(
            id,
            position,
            self.placeholder_text.clone(),
            self.font_family.clone(),
            self.font_size,
            self.color,
        )
    }

    pub fn rectangle_at(&self, id: ObjectId, position: Point) -> AnnotationObject {
        let (w, h) = self.default_rect_size;
        AnnotationObject::rectangle(id, position, w, h, self.color, self.shape_stroke_width)
    }

    pub fn circle_at(&self, id: ObjectId, position: Point) -> AnnotationObject {
        AnnotationObject::circle(
            id,
            position,
            self.default_circle_radius,
            self.color,
            self.shape_stroke_width,
        )
    }

    pub fn arrow(&self, id: ObjectId, start: Point, end: Point) -> AnnotationObject {
        AnnotationObject::arrow(id, start, end, self.color, self.arrow_stroke_width)
    }
}

/// Everything a tool may read while handling an event
pub struct ToolContext<'a> {
    pub canvas: &'a CanvasSurface,
    pub style: &'a ToolStyle,
    pub ids: &'a mut IdAllocator,
    pub hit_tolerance: f32,
    pub crop_handle_size: f32,
}

/// Sub-state of the active tool between pointer-down and pointer-up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Select tool dragging an object
    Moving { id: ObjectId, last: Point, moved: bool },
    /// Draw tool building a path
    Freehand { id: ObjectId, last: Point },
    /// Arrow tool between down and up; `preview` is set after the first move
    Arrow { start: Point, preview: Option<ObjectId> },
    /// Crop tool moving or resizing the region
    Crop { handle: DragState, last: Point },
}

#[derive(Debug, Clone, Default)]
pub struct ToolController {
    tool: Tool,
    gesture: Gesture,
    crop: Option<CropRegion>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        self.crop
    }

    /// Position the crop region explicitly (only while the crop tool is active)
    pub fn set_crop_region(&mut self, region: CropRegion) -> bool {
        if self.tool != Tool::Crop {
            return false;
        }
        self.crop = Some(region);
        true
    }

    /// Id of the uncommitted object an in-progress gesture is building
    pub fn preview_id(&self) -> Option<ObjectId> {
        match self.gesture {
            Gesture::Freehand { id, .. } => Some(id),
            Gesture::Arrow { preview, .. } => preview,
            _ => None,
        }
    }

    /// Switch tools, cancelling any gesture. Leaving `Crop` drops the region;
    /// entering it creates the default region if none exists.
    pub fn set_tool(&mut self, tool: Tool, canvas_size: (f32, f32)) -> Vec<Mutation> {
        let mutations = self.cancel_gesture();
        if self.tool == Tool::Crop && tool != Tool::Crop {
            self.crop = None;
        }
        if tool == Tool::Crop && self.crop.is_none() {
            self.crop = Some(CropRegion::default_for(canvas_size.0, canvas_size.1));
        }
        if self.tool != tool {
            log::debug!("Tool {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        mutations
    }

    /// Abandon the current gesture, asking to discard whatever it left uncommitted
    pub fn cancel_gesture(&mut self) -> Vec<Mutation> {
        let dirty = match std::mem::take(&mut self.gesture) {
            Gesture::Freehand { .. } => true,
            Gesture::Arrow { preview, .. } => preview.is_some(),
            Gesture::Moving { moved, .. } => moved,
            Gesture::Idle | Gesture::Crop { .. } => false,
        };
        if dirty { vec![Mutation::Discard] } else { Vec::new() }
    }

    /// Back to `Select` with no gesture and no crop region
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one pointer event to the active tool
    pub fn handle(&mut self, event: PointerEvent, ctx: ToolContext<'_>) -> Vec<Mutation> {
        if !event.position().is_finite() {
            return Vec::new();
        }
        match self.tool {
            Tool::Select => handlers::handle_select(&mut self.gesture, event, ctx),
            Tool::Draw => handlers::handle_draw(&mut self.gesture, event, ctx),
            Tool::Text | Tool::Rectangle | Tool::Circle => {
                handlers::handle_place(self.tool, &self.gesture, event, ctx)
            }
            Tool::Arrow => handlers::handle_arrow(&mut self.gesture, event, ctx),
            Tool::Crop => handlers::handle_crop(&mut self.gesture, &mut self.crop, event, ctx),
        }
    }
}
