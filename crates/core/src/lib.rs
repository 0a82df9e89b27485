//! Grid decoding and rendering core - pure, deterministic, and testable
//!
//! This crate turns packed forest cell codes into pixels and back. It has
//! **no dependencies** on terminals, networking, or I/O.
//!
//! # Module Structure
//!
//! - [`codec`]: 16-bit cell codes to tree/jack/bear fields and RGBA colors
//! - [`raster`]: grid snapshots to magnified RGBA buffers, plus the pixel → cell inverse
//! - [`census`]: glyph map, entity counts and elapsed-time formatting
//! - [`viewer`]: the displayed snapshot, magnification and selection held by a shell
//!
//! # Example
//!
//! ```
//! use forest_view_core::{pixel_to_cell_index, render, Rgba};
//! use forest_view_types::GridSnapshot;
//!
//! let snap = GridSnapshot::new(vec![0x00FF, 0x0000, 0x0F00, 0xF000], 2, 2);
//! let buf = render(&snap, 2).unwrap();
//!
//! assert_eq!((buf.width(), buf.height()), (4, 4));
//! assert_eq!(buf.pixel(3, 3), Some(Rgba::new(0, 0, 255, 255)));
//! assert_eq!(pixel_to_cell_index(3, 1, snap.width, 2), 1);
//! ```

pub mod census;
pub mod codec;
pub mod raster;
pub mod viewer;

pub use forest_view_types as types;

// Re-export commonly used items for convenience
pub use census::{format_elapsed, glyph, info_line, text_map, Census};
pub use codec::{
    bear_present, compose, decode, has_bear, has_jack, has_tree, jack_level, to_color,
    to_color_with, tree_age, tree_kind, DecodedCell, Rgba,
};
pub use raster::{
    cell_origin, pixel_dimensions, pixel_to_cell_index, render, render_into, render_with,
    PixelBuffer, RasterError, MAX_FRAME_PIXELS,
};
pub use viewer::Viewer;
