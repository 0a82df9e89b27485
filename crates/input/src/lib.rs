//! Terminal input module (viewer-facing).
//!
//! Maps `crossterm` key and mouse events into [`crate::types::ViewAction`]s and
//! click positions. Nothing here knows about grids or pixels; turning a click
//! into a cell is the view's job.

pub mod map;

pub use forest_view_types as types;

pub use map::{handle_key_event, handle_mouse_event, should_quit, Click};
