//! Keyboard shortcut mapping
//!
//! Maps key presses to `EditorCommand`s for the active tool.

use crate::session::messages::EditorCommand;
use crate::tools::Tool;

/// Keys the editor reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(String),
    Named(Named),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Named {
    Enter,
    Escape,
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        control: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        control: true,
        shift: false,
    };

    pub fn control(self) -> bool {
        self.control
    }

    pub fn shift(self) -> bool {
        self.shift
    }
}

pub fn handle_key_event(key: Key, modifiers: Modifiers, active_tool: Tool) -> Option<EditorCommand> {
    let in_crop = active_tool == Tool::Crop;

    match key {
        // Undo/redo shortcuts
        Key::Character(c) if c.eq_ignore_ascii_case("z") && modifiers.control() && !modifiers.shift() => {
            Some(EditorCommand::Undo)
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case("y") && modifiers.control())
                || (c.eq_ignore_ascii_case("z") && modifiers.control() && modifiers.shift()) =>
        {
            Some(EditorCommand::Redo)
        }
        Key::Character(c) if c.eq_ignore_ascii_case("s") && modifiers.control() => Some(EditorCommand::Save),
        // Crop confirm/cancel only mean something while cropping
        Key::Named(Named::Enter) if in_crop => Some(EditorCommand::ApplyCrop),
        Key::Named(Named::Escape) if in_crop => Some(EditorCommand::CancelCrop),
        Key::Named(Named::Delete | Named::Backspace) => Some(EditorCommand::DeleteSelected),
        // Tool shortcuts
        Key::Character(c) if !modifiers.control() => {
            let tool = match c.to_ascii_lowercase().as_str() {
                "v" => Tool::Select,
                "p" => Tool::Draw,
                "t" => Tool::Text,
                "r" => Tool::Rectangle,
                "c" => Tool::Circle,
                "a" => Tool::Arrow,
                "x" => Tool::Crop,
                _ => return None,
            };
            Some(EditorCommand::SetTool { tool })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: &str) -> Key {
        Key::Character(c.to_string())
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        assert_eq!(handle_key_event(ch("z"), Modifiers::CTRL, Tool::Select), Some(EditorCommand::Undo));
        assert_eq!(handle_key_event(ch("y"), Modifiers::CTRL, Tool::Select), Some(EditorCommand::Redo));
        let ctrl_shift = Modifiers {
            control: true,
            shift: true,
        };
        assert_eq!(handle_key_event(ch("Z"), ctrl_shift, Tool::Draw), Some(EditorCommand::Redo));
        assert_eq!(handle_key_event(ch("s"), Modifiers::CTRL, Tool::Draw), Some(EditorCommand::Save));
    }

    #[test]
    fn test_crop_keys_only_in_crop_tool() {
        let enter = Key::Named(Named::Enter);
        assert_eq!(handle_key_event(enter.clone(), Modifiers::NONE, Tool::Crop), Some(EditorCommand::ApplyCrop));
        assert_eq!(handle_key_event(enter, Modifiers::NONE, Tool::Select), None);
        assert_eq!(
            handle_key_event(Key::Named(Named::Escape), Modifiers::NONE, Tool::Crop),
            Some(EditorCommand::CancelCrop)
        );
    }

    #[test]
    fn test_tool_letters() {
        assert_eq!(
            handle_key_event(ch("a"), Modifiers::NONE, Tool::Select),
            Some(EditorCommand::SetTool { tool: Tool::Arrow })
        );
        assert_eq!(
            handle_key_event(ch("x"), Modifiers::NONE, Tool::Select),
            Some(EditorCommand::SetTool { tool: Tool::Crop })
        );
        assert_eq!(
            handle_key_event(ch("V"), Modifiers::NONE, Tool::Draw),
            Some(EditorCommand::SetTool { tool: Tool::Select })
        );
        assert_eq!(handle_key_event(ch("q"), Modifiers::NONE, Tool::Select), None);
        assert_eq!(handle_key_event(ch("a"), Modifiers::CTRL, Tool::Select), None);
    }

    #[test]
    fn test_delete_keys() {
        for named in [Named::Delete, Named::Backspace] {
            assert_eq!(
                handle_key_event(Key::Named(named), Modifiers::NONE, Tool::Select),
                Some(EditorCommand::DeleteSelected)
            );
        }
    }
}
