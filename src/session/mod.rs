//! Editor session module
//!
//! This module contains:
//! - Session state and command dispatch
//! - Pointer events and serializable commands
//! - Keyboard shortcut mapping

pub mod messages;
pub mod shortcuts;
pub mod state;

pub use messages::{EditorCommand, PointerEvent};
pub use state::EditorSession;
