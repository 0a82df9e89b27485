//! Cell codec: packed 16-bit cell codes to fields and colors.
//!
//! Every function here is total over `u16`; there is no invalid cell code.

use crate::types::{
    CellCode, ColorMode, TreeKind, BEAR_MASK, BEAR_SHIFT, JACK_MASK, JACK_SHIFT, OPAQUE_ALPHA,
    TREE_MASK, TREE_SHIFT,
};

const TREE_FILL: u32 = 0x00FF00;
const JACK_FILL: u32 = 0xFF0000;
const BEAR_FILL: u32 = 0x0000FF;

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_slice(px: &[u8]) -> Option<Self> {
        match px {
            [r, g, b, a] => Some(Self::new(*r, *g, *b, *a)),
            _ => None,
        }
    }
}

/// Decoded fields of a cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedCell {
    pub tree_age: u8,
    pub jack_level: u8,
    pub bear: bool,
}

impl DecodedCell {
    pub fn tree_kind(&self) -> TreeKind {
        TreeKind::from_age(self.tree_age)
    }
}

#[inline]
pub fn has_tree(cell: CellCode) -> bool {
    tree_age(cell) > 0
}

#[inline]
pub fn has_jack(cell: CellCode) -> bool {
    jack_level(cell) > 0
}

#[inline]
pub fn has_bear(cell: CellCode) -> bool {
    (cell & BEAR_MASK) >> BEAR_SHIFT > 0
}

/// Raw low byte. Zero means "no tree" and cannot be told apart from a tree of age zero.
#[inline]
pub fn tree_age(cell: CellCode) -> u8 {
    ((cell & TREE_MASK) >> TREE_SHIFT) as u8
}

#[inline]
pub fn jack_level(cell: CellCode) -> u8 {
    ((cell & JACK_MASK) >> JACK_SHIFT) as u8
}

#[inline]
pub fn bear_present(cell: CellCode) -> bool {
    has_bear(cell)
}

pub fn tree_kind(cell: CellCode) -> TreeKind {
    TreeKind::from_age(tree_age(cell))
}

pub fn decode(cell: CellCode) -> DecodedCell {
    DecodedCell {
        tree_age: tree_age(cell),
        jack_level: jack_level(cell),
        bear: bear_present(cell),
    }
}

/// Pack fields back into a cell code.
///
/// `jack_level` is truncated to its 4-bit field. A present bear is stored as 1.
pub fn compose(tree_age: u8, jack_level: u8, bear: bool) -> CellCode {
    let tree = (tree_age as CellCode) << TREE_SHIFT;
    let jack = ((jack_level as CellCode) << JACK_SHIFT) & JACK_MASK;
    let bear = if bear { 1 << BEAR_SHIFT } else { 0 };
    tree | jack | bear
}

/// Display color of a cell: tree adds green, jack adds red, bear adds blue.
pub fn to_color(cell: CellCode) -> Rgba {
    to_color_with(cell, ColorMode::Opaque)
}

pub fn to_color_with(cell: CellCode, mode: ColorMode) -> Rgba {
    let mut fill: u32 = 0x000000;

    if has_tree(cell) {
        fill += TREE_FILL;
    }
    if has_jack(cell) {
        fill += JACK_FILL;
    }
    if has_bear(cell) {
        fill += BEAR_FILL;
    }

    let a = match mode {
        ColorMode::Opaque => OPAQUE_ALPHA,
        ColorMode::AgeFade => tree_age(cell),
    };

    Rgba {
        r: ((fill & 0xFF0000) >> 16) as u8,
        g: ((fill & 0x00FF00) >> 8) as u8,
        b: (fill & 0x0000FF) as u8,
        a,
    }
}
