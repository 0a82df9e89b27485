//! Terminal "grid renderer" module.
//!
//! Renders the viewer's RGBA frame into a framebuffer of half-block cells and
//! flushes it to a terminal backend. No widgets or layout library: the grid
//! view decides where every cell goes.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Two grid pixels per terminal cell, composited over the canvas color
//! - Map terminal clicks back to frame pixels for inspection

pub mod fb;
pub mod grid_view;
pub mod log_tail;
pub mod renderer;

pub use forest_view_core as core;
pub use forest_view_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb, HALF_BLOCK};
pub use grid_view::{GridView, StatusView, Viewport, CANVAS_BACKGROUND, PIXEL_ROWS_PER_CELL};
pub use log_tail::LogTail;
pub use renderer::{encode_frame_into, TerminalRenderer};
