//! Grid rasterizer: grid snapshots to magnified RGBA pixel buffers.
//!
//! A cell at flat index `i` lands at grid coordinate `(i % width, i / width)` and
//! is drawn as a `cell_size × cell_size` block anchored at
//! `(gx * cell_size, gy * cell_size)`. Blocks tile the buffer exactly, so every
//! render overwrites every pixel and no stale data survives between snapshots.
//!
//! [`pixel_to_cell_index`] is the exact inverse of that mapping.

use thiserror::Error;

use crate::codec::{to_color_with, Rgba};
use crate::types::{ColorMode, GridSnapshot};

const BYTES_PER_PIXEL: usize = 4;

/// Largest frame `render` will allocate (1 GiB of RGBA).
pub const MAX_FRAME_PIXELS: usize = 1 << 28;

/// Contract violations detected before any pixel is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("cell size must be at least 1")]
    ZeroCellSize,
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("grid {width}x{height} needs {expected} cells, snapshot has {actual}")]
    CellCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("grid {width}x{height} at cell size {cell_size} does not fit in memory")]
    TooLarge {
        width: usize,
        height: usize,
        cell_size: u32,
    },
}

/// RGBA pixels, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        Rgba::from_slice(&self.data[i..i + BYTES_PER_PIXEL])
    }

    /// Change the declared dimensions, keeping the allocation when possible.
    ///
    /// Pixel contents are unspecified afterwards; callers overwrite them.
    fn reshape(&mut self, width: usize, height: usize, len: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(len, 0);
    }

    fn fill_span(&mut self, x: usize, y: usize, len: usize, rgba: [u8; 4]) {
        let start = (y * self.width + x) * BYTES_PER_PIXEL;
        let end = start + len * BYTES_PER_PIXEL;
        for px in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }
}

/// Pixel dimensions of a grid rendered at `cell_size`, after validating the snapshot.
pub fn pixel_dimensions(
    snapshot: &GridSnapshot,
    cell_size: u32,
) -> Result<(usize, usize), RasterError> {
    if cell_size == 0 {
        return Err(RasterError::ZeroCellSize);
    }
    let (width, height) = (snapshot.width, snapshot.height);
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyGrid { width, height });
    }

    let too_large = RasterError::TooLarge {
        width,
        height,
        cell_size,
    };
    let expected = width.checked_mul(height).ok_or_else(|| too_large.clone())?;
    if snapshot.cells.len() != expected {
        return Err(RasterError::CellCountMismatch {
            width,
            height,
            expected,
            actual: snapshot.cells.len(),
        });
    }

    let cs = cell_size as usize;
    let px_w = width.checked_mul(cs).ok_or_else(|| too_large.clone())?;
    let px_h = height.checked_mul(cs).ok_or_else(|| too_large.clone())?;
    match px_w.checked_mul(px_h) {
        Some(pixels) if pixels <= MAX_FRAME_PIXELS => Ok((px_w, px_h)),
        _ => Err(too_large),
    }
}

/// Render a snapshot with opaque colors into a fresh buffer.
pub fn render(snapshot: &GridSnapshot, cell_size: u32) -> Result<PixelBuffer, RasterError> {
    render_with(snapshot, cell_size, ColorMode::Opaque)
}

pub fn render_with(
    snapshot: &GridSnapshot,
    cell_size: u32,
    mode: ColorMode,
) -> Result<PixelBuffer, RasterError> {
    let mut out = PixelBuffer::default();
    render_into(snapshot, cell_size, mode, &mut out)?;
    Ok(out)
}

/// Render into an existing buffer, reshaping it to the grid's pixel dimensions.
///
/// On error the buffer is left untouched.
pub fn render_into(
    snapshot: &GridSnapshot,
    cell_size: u32,
    mode: ColorMode,
    out: &mut PixelBuffer,
) -> Result<(), RasterError> {
    let (px_w, px_h) = pixel_dimensions(snapshot, cell_size)?;
    out.reshape(px_w, px_h, px_w * px_h * BYTES_PER_PIXEL);

    let cs = cell_size as usize;
    for (i, &cell) in snapshot.cells.iter().enumerate() {
        let (ox, oy) = cell_origin(i, snapshot.width, cell_size);
        let rgba = to_color_with(cell, mode).to_array();
        for dy in 0..cs {
            out.fill_span(ox, oy + dy, cs, rgba);
        }
    }
    Ok(())
}

/// Top-left pixel of the block drawn for the cell at `index`.
#[inline]
pub fn cell_origin(index: usize, width: usize, cell_size: u32) -> (usize, usize) {
    let cs = cell_size as usize;
    ((index % width) * cs, (index / width) * cs)
}

/// Flat cell index under pixel `(px, py)`.
///
/// No bounds checks: callers keep `px < width * cell_size` and the row inside
/// the grid. Panics if `cell_size` is zero.
#[inline]
pub fn pixel_to_cell_index(px: usize, py: usize, width: usize, cell_size: u32) -> usize {
    let cs = cell_size as usize;
    (py / cs) * width + (px / cs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(cells: Vec<u16>, width: usize, height: usize) -> GridSnapshot {
        GridSnapshot::new(cells, width, height)
    }

    #[test]
    fn dimensions_scale_with_cell_size() {
        let s = snap(vec![0; 6], 3, 2);
        assert_eq!(pixel_dimensions(&s, 1), Ok((3, 2)));
        assert_eq!(pixel_dimensions(&s, 4), Ok((12, 8)));
    }

    #[test]
    fn rejects_contract_violations() {
        let s = snap(vec![0; 4], 2, 2);
        assert_eq!(render(&s, 0), Err(RasterError::ZeroCellSize));

        let s = snap(vec![0; 3], 2, 2);
        assert_eq!(
            render(&s, 1),
            Err(RasterError::CellCountMismatch {
                width: 2,
                height: 2,
                expected: 4,
                actual: 3
            })
        );

        let s = snap(vec![], 0, 5);
        assert_eq!(render(&s, 1), Err(RasterError::EmptyGrid { width: 0, height: 5 }));
    }

    #[test]
    fn rejects_buffers_that_overflow() {
        let s = snap(vec![0], 1, 1);
        assert_eq!(
            pixel_dimensions(&s, u32::MAX),
            Err(RasterError::TooLarge {
                width: 1,
                height: 1,
                cell_size: u32::MAX
            })
        );
    }

    #[test]
    fn rejects_frames_over_the_pixel_cap() {
        let s = snap(vec![0; 1024 * 16], 1024, 16);
        assert_eq!(pixel_dimensions(&s, 16), Ok((16384, 256)));

        let s = snap(vec![0], 1, 1);
        assert_eq!(pixel_dimensions(&s, 1 << 14), Ok((1 << 14, 1 << 14)));
        assert!(matches!(
            pixel_dimensions(&s, (1 << 14) + 1),
            Err(RasterError::TooLarge { .. })
        ));
    }

    #[test]
    fn failed_render_leaves_buffer_untouched() {
        let good = snap(vec![0x00FF; 4], 2, 2);
        let mut buf = render(&good, 2).unwrap();
        let before = buf.clone();

        let bad = snap(vec![0; 5], 2, 2);
        assert!(render_into(&bad, 2, ColorMode::Opaque, &mut buf).is_err());
        assert_eq!(buf, before);
    }

    #[test]
    fn origin_and_index_are_inverse() {
        for width in 1..6 {
            for cs in 1..5u32 {
                for i in 0..(width * 4) {
                    let (ox, oy) = cell_origin(i, width, cs);
                    assert_eq!(pixel_to_cell_index(ox, oy, width, cs), i);
                    let last = cs as usize - 1;
                    assert_eq!(pixel_to_cell_index(ox + last, oy + last, width, cs), i);
                }
            }
        }
    }

    #[test]
    fn pixel_accessor_is_bounds_checked() {
        let buf = render(&snap(vec![0x0F00], 1, 1), 2).unwrap();
        assert_eq!(buf.pixel(1, 1), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }
}
