//! Text rendering of a grid: glyph map, entity census and elapsed time.

use std::fmt;

use crate::codec::{has_bear, has_jack, has_tree, tree_kind};
use crate::types::{CellCode, GridSnapshot, TreeKind, MONTHS_PER_YEAR};

/// Number of cells hosting each kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Census {
    pub trees: usize,
    pub jacks: usize,
    pub bears: usize,
}

impl Census {
    pub fn of(cells: &[CellCode]) -> Self {
        cells.iter().fold(Census::default(), |mut acc, &c| {
            acc.trees += has_tree(c) as usize;
            acc.jacks += has_jack(c) as usize;
            acc.bears += has_bear(c) as usize;
            acc
        })
    }
}

impl fmt::Display for Census {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bears {}, jacks {}, trees {}",
            self.bears, self.jacks, self.trees
        )
    }
}

pub fn format_elapsed(months_elapsed: u32) -> String {
    format!(
        "year {}, month {}",
        months_elapsed / MONTHS_PER_YEAR,
        months_elapsed % MONTHS_PER_YEAR
    )
}

/// `"year Y, month M | bears B, jacks J, trees T"`
pub fn info_line(snapshot: &GridSnapshot) -> String {
    format!(
        "{} | {}",
        format_elapsed(snapshot.months_elapsed),
        Census::of(&snapshot.cells)
    )
}

/// One character per cell.
///
/// Single occupants get a letter (`B`, `@`, `t`/`T`/`E` by tree stage);
/// shared cells get a digit: `3` bear+jack, `4` bear+tree, `5` jack+tree, `6` all.
pub fn glyph(cell: CellCode) -> char {
    match (has_bear(cell), has_jack(cell), tree_kind(cell)) {
        (false, false, TreeKind::None) => '.',
        (true, false, TreeKind::None) => 'B',
        (false, true, TreeKind::None) => '@',
        (false, false, TreeKind::Sapling) => 't',
        (false, false, TreeKind::Mature) => 'T',
        (false, false, TreeKind::Elder) => 'E',
        (true, true, TreeKind::None) => '3',
        (true, false, _) => '4',
        (false, true, _) => '5',
        (true, true, _) => '6',
    }
}

/// Rows of glyphs separated by newlines. Rows past the end of `cells` are omitted.
pub fn text_map(snapshot: &GridSnapshot) -> String {
    if snapshot.width == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(snapshot.cells.len() + snapshot.height);
    for (y, row) in snapshot.cells.chunks(snapshot.width).enumerate() {
        if y > 0 {
            out.push('\n');
        }
        out.extend(row.iter().map(|&c| glyph(c)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_counts_each_field_independently() {
        let c = Census::of(&[0x0000, 0x00FF, 0x0F00, 0xF000, 0xFFFF]);
        assert_eq!(
            c,
            Census {
                trees: 2,
                jacks: 2,
                bears: 2
            }
        );
        assert_eq!(c.to_string(), "bears 2, jacks 2, trees 2");
    }

    #[test]
    fn elapsed_time_splits_years() {
        assert_eq!(format_elapsed(0), "year 0, month 0");
        assert_eq!(format_elapsed(25), "year 2, month 1");
        assert_eq!(format_elapsed(4800), "year 400, month 0");
    }

    #[test]
    fn glyph_table() {
        assert_eq!(glyph(0x0000), '.');
        assert_eq!(glyph(0x1000), 'B');
        assert_eq!(glyph(0x0300), '@');
        assert_eq!(glyph(0x0001), 't');
        assert_eq!(glyph(0x000C), 'T');
        assert_eq!(glyph(0x0078), 'E');
        assert_eq!(glyph(0x1100), '3');
        assert_eq!(glyph(0x1005), '4');
        assert_eq!(glyph(0x0105), '5');
        assert_eq!(glyph(0x1105), '6');
    }

    #[test]
    fn text_map_breaks_rows() {
        let s = GridSnapshot::new(vec![0x0000, 0x0001, 0x1000, 0x0100], 2, 2)
            .with_counters(13, 0, 0);
        assert_eq!(text_map(&s), ".t\nB@");
        assert_eq!(info_line(&s), "year 1, month 1 | bears 1, jacks 1, trees 1");
    }
}
