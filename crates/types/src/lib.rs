//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the viewer.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (codec, rasterizer, terminal rendering, wire client).
//!
//! # Cell Layout
//!
//! Every grid cell is a packed 16-bit code:
//!
//! | Bits | Mask | Meaning |
//! |------|------|---------|
//! | 0..7 | `0x00FF` | Tree age in ticks (0 = no tree) |
//! | 8..11 | `0x0F00` | Lumberjack level (0 = absent, 1..15) |
//! | 12..15 | `0xF000` | Bear presence (nonzero = present) |
//!
//! The three fields partition the code. A cell may host any combination of them.
//!
//! # Tree Ages
//!
//! - `age == 0`: no tree
//! - `age < 12`: sapling
//! - `age < 120`: mature
//! - otherwise: elder
//!
//! # Examples
//!
//! ```
//! use forest_view_types::{GridSnapshot, TreeKind, TREE_MASK};
//!
//! let snap = GridSnapshot::new(vec![0x00FF, 0x0000, 0x0F00, 0xF000], 2, 2);
//! assert!(snap.is_consistent());
//! assert_eq!(snap.cells[0] & TREE_MASK, 0x00FF);
//!
//! assert_eq!(TreeKind::from_age(0), TreeKind::None);
//! assert_eq!(TreeKind::from_age(12), TreeKind::Mature);
//! ```

/// A packed 16-bit cell state.
pub type CellCode = u16;

/// Tree age field (low byte).
pub const TREE_MASK: CellCode = 0x00FF;

/// Lumberjack level field (third nibble).
pub const JACK_MASK: CellCode = 0x0F00;

/// Bear presence field (high nibble).
pub const BEAR_MASK: CellCode = 0xF000;

pub const TREE_SHIFT: u32 = 0;
pub const JACK_SHIFT: u32 = 8;
pub const BEAR_SHIFT: u32 = 12;

/// Trees younger than this are saplings.
pub const SAPLING_GROW_AGE: u8 = 12;

/// Trees younger than this (and not saplings) are mature; older ones are elders.
pub const MATURE_GROW_AGE: u8 = 120;

/// Months per simulated year, used when formatting elapsed time.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Seed used when the user does not provide one.
pub const DEFAULT_SEED: u64 = 123123;

/// Default grid width in cells.
pub const DEFAULT_GRID_WIDTH: usize = 120;

/// Default grid height in cells.
pub const DEFAULT_GRID_HEIGHT: usize = 80;

/// Default magnification (device pixels per cell edge).
///
/// Even, so a display packing two pixel rows per character still shows every row.
pub const DEFAULT_CELL_SIZE: u32 = 2;

/// Smallest magnification accepted by the viewer.
pub const MIN_CELL_SIZE: u32 = 1;

/// Largest magnification accepted by the viewer.
pub const MAX_CELL_SIZE: u32 = 16;

/// Default autoplay interval (one advance + fetch per interval).
pub const DEFAULT_AUTOPLAY_MS: u64 = 250;

/// Opaque alpha used for normal rendering.
pub const OPAQUE_ALPHA: u8 = 255;

/// Full simulation state at one instant.
///
/// `cells` is row-major with the origin at the top-left corner.
/// `cells.len() == width * height` is a backend contract; use
/// [`GridSnapshot::is_consistent`] to check it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GridSnapshot {
    pub cells: Vec<CellCode>,
    pub width: usize,
    pub height: usize,
    pub months_elapsed: u32,
    pub yearly_lumber: u32,
    pub yearly_mauls: u32,
}

impl GridSnapshot {
    /// Build a snapshot with zeroed counters.
    pub fn new(cells: Vec<CellCode>, width: usize, height: usize) -> Self {
        Self {
            cells,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_counters(
        mut self,
        months_elapsed: u32,
        yearly_lumber: u32,
        yearly_mauls: u32,
    ) -> Self {
        self.months_elapsed = months_elapsed;
        self.yearly_lumber = yearly_lumber;
        self.yearly_mauls = yearly_mauls;
        self
    }

    /// Whether the cell count matches the declared dimensions.
    pub fn is_consistent(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .map(|n| n == self.cells.len())
            .unwrap_or(false)
    }

    pub fn cell(&self, index: usize) -> Option<CellCode> {
        self.cells.get(index).copied()
    }
}

/// A cell picked by clicking on the rendered grid.
///
/// Plain value: it carries the code sampled at click time and the screen
/// coordinate of the click, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectedCell {
    pub cell_code: CellCode,
    pub screen_x: u32,
    pub screen_y: u32,
}

/// Growth stage derived from a tree age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    None,
    Sapling,
    Mature,
    Elder,
}

impl TreeKind {
    pub fn from_age(age: u8) -> Self {
        match age {
            0 => TreeKind::None,
            a if a < SAPLING_GROW_AGE => TreeKind::Sapling,
            a if a < MATURE_GROW_AGE => TreeKind::Mature,
            _ => TreeKind::Elder,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TreeKind::None => "none",
            TreeKind::Sapling => "sapling",
            TreeKind::Mature => "mature",
            TreeKind::Elder => "elder",
        }
    }
}

/// How the alpha channel of a rendered cell is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Alpha is always 255.
    #[default]
    Opaque,
    /// Alpha is the raw tree age byte (0 = fully transparent).
    AgeFade,
}

impl ColorMode {
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Opaque => ColorMode::AgeFade,
            ColorMode::AgeFade => ColorMode::Opaque,
        }
    }
}

/// User-facing viewer actions.
///
/// Produced by key mapping and consumed by the shell loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    /// Advance the simulation one step, then fetch the grid
    Advance,
    /// Fetch the current grid without advancing
    Fetch,
    /// Start or stop periodic advance + fetch
    ToggleAutoplay,
    /// Increase the cell size by one zoom step
    ZoomIn,
    /// Decrease the cell size by one zoom step
    ZoomOut,
    /// Switch between opaque and age-fade colors
    ToggleFade,
    /// Create a fresh grid with a new seed
    Recreate,
    /// Forget the selected cell
    ClearSelection,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_fields_partition_the_code() {
        assert_eq!(TREE_MASK | JACK_MASK | BEAR_MASK, 0xFFFF);
        assert_eq!(TREE_MASK & JACK_MASK, 0);
        assert_eq!(JACK_MASK & BEAR_MASK, 0);
        assert_eq!(TREE_MASK & BEAR_MASK, 0);

        assert_eq!(JACK_MASK >> JACK_SHIFT, 0x0F);
        assert_eq!(BEAR_MASK >> BEAR_SHIFT, 0x0F);
        assert_eq!(TREE_MASK >> TREE_SHIFT, 0xFF);
    }

    #[test]
    fn tree_kind_thresholds() {
        assert_eq!(TreeKind::from_age(0), TreeKind::None);
        assert_eq!(TreeKind::from_age(1), TreeKind::Sapling);
        assert_eq!(TreeKind::from_age(11), TreeKind::Sapling);
        assert_eq!(TreeKind::from_age(12), TreeKind::Mature);
        assert_eq!(TreeKind::from_age(119), TreeKind::Mature);
        assert_eq!(TreeKind::from_age(120), TreeKind::Elder);
        assert_eq!(TreeKind::from_age(255), TreeKind::Elder);
    }

    #[test]
    fn snapshot_consistency() {
        assert!(GridSnapshot::new(vec![0; 6], 3, 2).is_consistent());
        assert!(!GridSnapshot::new(vec![0; 5], 3, 2).is_consistent());
        assert!(!GridSnapshot::new(vec![], usize::MAX, 2).is_consistent());
    }

    #[test]
    fn color_mode_toggles() {
        assert_eq!(ColorMode::default(), ColorMode::Opaque);
        assert_eq!(ColorMode::Opaque.toggled(), ColorMode::AgeFade);
        assert_eq!(ColorMode::AgeFade.toggled(), ColorMode::Opaque);
    }
}
