//! Per-tool pointer handlers
//!
//! Each handler advances the gesture and reports the mutations it wants.

use super::{Gesture, Mutation, Tool, ToolContext};
use crate::domain::{CropRegion, DragState};
use crate::session::messages::PointerEvent;

// ============================================================================
// Select
// ============================================================================

pub(super) fn handle_select(
    gesture: &mut Gesture,
    event: PointerEvent,
    ctx: ToolContext<'_>,
) -> Vec<Mutation> {
    match (event, *gesture) {
        (PointerEvent::Down(p), Gesture::Idle) => {
            let hit = ctx.canvas.hit_test(p, ctx.hit_tolerance);
            if let Some(id) = hit {
                *gesture = Gesture::Moving {
                    id,
                    last: p,
                    moved: false,
                };
            }
            vec![Mutation::Select(hit)]
        }
        (PointerEvent::Move(p), Gesture::Moving { id, last, .. }) => {
            let (dx, dy) = (p.x - last.x, p.y - last.y);
            if dx == 0.0 && dy == 0.0 {
                return Vec::new();
            }
            *gesture = Gesture::Moving {
                id,
                last: p,
                moved: true,
            };
            vec![Mutation::Translate { id, dx, dy }]
        }
        (PointerEvent::Up(p), Gesture::Moving { id, last, moved }) => {
            *gesture = Gesture::Idle;
            let (dx, dy) = (p.x - last.x, p.y - last.y);
            let mut out = Vec::new();
            if dx != 0.0 || dy != 0.0 {
                out.push(Mutation::Translate { id, dx, dy });
            }
            if moved || !out.is_empty() {
                out.push(Mutation::Commit);
            }
            out
        }
        _ => Vec::new(),
    }
}

// ============================================================================
// Freehand drawing
// ============================================================================

pub(super) fn handle_draw(
    gesture: &mut Gesture,
    event: PointerEvent,
    ctx: ToolContext<'_>,
) -> Vec<Mutation> {
    match (event, *gesture) {
        (PointerEvent::Down(p), Gesture::Idle) => {
            let id = ctx.ids.next_id();
            *gesture = Gesture::Freehand { id, last: p };
            let path = crate::domain::AnnotationObject::freehand(
                id,
                p,
                ctx.style.color,
                ctx.style.brush_size,
            );
            vec![Mutation::Preview(path)]
        }
        (PointerEvent::Move(p), Gesture::Freehand { id, last }) => {
            if p == last {
                return Vec::new();
            }
            *gesture = Gesture::Freehand { id, last: p };
            vec![Mutation::ExtendPath { id, point: p }]
        }
        (PointerEvent::Up(p), Gesture::Freehand { id, last }) => {
            *gesture = Gesture::Idle;
            let mut out = Vec::new();
            if p != last {
                out.push(Mutation::ExtendPath { id, point: p });
            }
            out.push(Mutation::Commit);
            out
        }
        _ => Vec::new(),
    }
}

// ============================================================================
// Text, rectangle and circle placement
// ============================================================================

/// One click places an object with default geometry at the pointer
pub(super) fn handle_place(
    tool: Tool,
    gesture: &Gesture,
    event: PointerEvent,
    ctx: ToolContext<'_>,
) -> Vec<Mutation> {
    let PointerEvent::Down(p) = event else {
        return Vec::new();
    };
    if *gesture != Gesture::Idle {
        return Vec::new();
    }
    let id = ctx.ids.next_id();
    let object = match tool {
        Tool::Text => ctx.style.text_at(id, p),
        Tool::Rectangle => ctx.style.rectangle_at(id, p),
        Tool::Circle => ctx.style.circle_at(id, p),
        _ => return Vec::new(),
    };
    vec![Mutation::Append(object), Mutation::Select(Some(id))]
}

// ============================================================================
// Arrow
// ============================================================================

pub(super) fn handle_arrow(
    gesture: &mut Gesture,
    event: PointerEvent,
    ctx: ToolContext<'_>,
) -> Vec<Mutation> {
    match (event, *gesture) {
        (PointerEvent::Down(p), Gesture::Idle) => {
            *gesture = Gesture::Arrow {
                start: p,
                preview: None,
            };
            Vec::new()
        }
        (PointerEvent::Move(p), Gesture::Arrow { start, preview }) => {
            let id = preview.unwrap_or_else(|| ctx.ids.next_id());
            *gesture = Gesture::Arrow {
                start,
                preview: Some(id),
            };
            vec![Mutation::Preview(ctx.style.arrow(id, start, p))]
        }
        (PointerEvent::Up(p), Gesture::Arrow { start, preview }) => {
            *gesture = Gesture::Idle;
            let id = preview.unwrap_or_else(|| ctx.ids.next_id());
            vec![
                Mutation::Preview(ctx.style.arrow(id, start, p)),
                Mutation::Commit,
            ]
        }
        _ => Vec::new(),
    }
}

// ============================================================================
// Crop region adjustment
// ============================================================================

/// Moves or resizes the crop region. Never touches the canvas.
pub(super) fn handle_crop(
    gesture: &mut Gesture,
    crop: &mut Option<CropRegion>,
    event: PointerEvent,
    ctx: ToolContext<'_>,
) -> Vec<Mutation> {
    let Some(region) = crop.as_mut() else {
        return Vec::new();
    };
    match (event, *gesture) {
        (PointerEvent::Down(p), Gesture::Idle) => {
            let handle = region.handle_at(p, ctx.crop_handle_size);
            if handle != DragState::None {
                *gesture = Gesture::Crop { handle, last: p };
            }
        }
        (PointerEvent::Move(p), Gesture::Crop { handle, last }) => {
            region.drag(handle, p.x - last.x, p.y - last.y);
            *gesture = Gesture::Crop { handle, last: p };
        }
        (PointerEvent::Up(p), Gesture::Crop { handle, last }) => {
            region.drag(handle, p.x - last.x, p.y - last.y);
            *gesture = Gesture::Idle;
        }
        _ => {}
    }
    Vec::new()
}
