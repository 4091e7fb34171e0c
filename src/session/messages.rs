//! Input types for the editor session
//!
//! This module contains:
//! - PointerEvent, the raw pointer stream fed to the active tool
//! - EditorCommand, every user-level action as a serializable value

use serde::{Deserialize, Serialize};

use crate::domain::{CropRegion, Point};
use crate::tools::Tool;

// ============================================================================
// Pointer Events
// ============================================================================

/// Pointer event in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => p,
        }
    }
}

// ============================================================================
// Editor Commands
// ============================================================================

/// One user action. Scripts replayed by the binary are JSON arrays of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    SetTool { tool: Tool },
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    /// Toolbar buttons: place at the default position
    AddText,
    AddRectangle,
    AddCircle,
    /// Replace the content of the selected text label
    EditText { content: String },
    /// Finish a text edit as one history entry
    CommitText,
    /// `#rrggbb`
    SetColor { color: String },
    SetBrushSize { size: f32 },
    SetFontSize { size: f32 },
    DeleteSelected,
    ClearAnnotations,
    Undo,
    Redo,
    SetCropRegion {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },
    ApplyCrop,
    CancelCrop,
    Save,
}

impl EditorCommand {
    /// Pointer event carried by this command, if any
    pub fn pointer_event(&self) -> Option<PointerEvent> {
        match *self {
            EditorCommand::PointerDown { x, y } => Some(PointerEvent::Down(Point::new(x, y))),
            EditorCommand::PointerMove { x, y } => Some(PointerEvent::Move(Point::new(x, y))),
            EditorCommand::PointerUp { x, y } => Some(PointerEvent::Up(Point::new(x, y))),
            _ => None,
        }
    }

    pub fn crop_region(&self) -> Option<CropRegion> {
        match *self {
            EditorCommand::SetCropRegion {
                left,
                top,
                width,
                height,
            } => Some(CropRegion::new(left, top, width, height)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_json_shape() {
        let script = r#"[
            {"command": "set_tool", "tool": "arrow"},
            {"command": "pointer_down", "x": 100, "y": 100},
            {"command": "pointer_up", "x": 200, "y": 150},
            {"command": "edit_text", "content": "Look"},
            {"command": "save"}
        ]"#;
        let commands: Vec<EditorCommand> = serde_json::from_str(script).unwrap();
        assert_eq!(commands[0], EditorCommand::SetTool { tool: Tool::Arrow });
        assert_eq!(
            commands[2].pointer_event(),
            Some(PointerEvent::Up(Point::new(200.0, 150.0)))
        );
        assert_eq!(commands[4], EditorCommand::Save);
        assert_eq!(commands[3].pointer_event(), None);
    }

    #[test]
    fn test_crop_region_command() {
        let cmd = EditorCommand::SetCropRegion {
            left: 1.0,
            top: 2.0,
            width: 3.0,
            height: 4.0,
        };
        assert_eq!(cmd.crop_region(), Some(CropRegion::new(1.0, 2.0, 3.0, 4.0)));
    }
}
