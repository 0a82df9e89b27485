//! Viewer state owned by the shell.
//!
//! Holds the displayed snapshot, the magnification, the color mode, the current
//! selection and one reusable frame. Every change that affects pixels re-renders
//! the frame from the held snapshot; nothing is cached across snapshots.

use crate::raster::{pixel_to_cell_index, render_into, PixelBuffer, RasterError};
use crate::types::{
    ColorMode, GridSnapshot, SelectedCell, DEFAULT_CELL_SIZE, MAX_CELL_SIZE, MIN_CELL_SIZE,
};

#[derive(Debug, Clone)]
pub struct Viewer {
    snapshot: Option<GridSnapshot>,
    cell_size: u32,
    zoom_step: u32,
    mode: ColorMode,
    selected: Option<SelectedCell>,
    frame: PixelBuffer,
    generation: u64,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE, ColorMode::Opaque)
    }
}

impl Viewer {
    pub fn new(cell_size: u32, mode: ColorMode) -> Self {
        Self {
            snapshot: None,
            cell_size: clamp_cell_size(cell_size),
            zoom_step: 1,
            mode,
            selected: None,
            frame: PixelBuffer::default(),
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&GridSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    pub fn selected(&self) -> Option<SelectedCell> {
        self.selected
    }

    /// The most recent render. Empty until the first snapshot arrives.
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    /// Bumped on every successful re-render.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Display a new snapshot.
    ///
    /// A malformed snapshot is rejected and the previous one stays on screen.
    /// When the grid dimensions change the selection is dropped; otherwise it
    /// is re-sampled at the same screen position.
    pub fn apply_snapshot(&mut self, snapshot: GridSnapshot) -> Result<(), RasterError> {
        render_into(&snapshot, self.cell_size, self.mode, &mut self.frame)?;
        self.generation += 1;

        let same_dims = self
            .snapshot
            .as_ref()
            .map(|old| old.width == snapshot.width && old.height == snapshot.height)
            .unwrap_or(false);
        self.snapshot = Some(snapshot);

        self.selected = match self.selected {
            Some(sel) if same_dims => self.resolve(sel.screen_x, sel.screen_y),
            _ => None,
        };
        Ok(())
    }

    /// Restrict magnification to multiples of `step` (at least `step`).
    ///
    /// Displays that pack several pixel rows into one character need this so
    /// that every grid row starts on a row they can hit.
    pub fn set_zoom_step(&mut self, step: u32) -> Result<(), RasterError> {
        let previous = self.zoom_step;
        self.zoom_step = step.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
        let result = self.set_cell_size(self.cell_size);
        if result.is_err() {
            self.zoom_step = previous;
        }
        result
    }

    pub fn zoom_step(&self) -> u32 {
        self.zoom_step
    }

    /// Change magnification, snapped to the zoom step and clamped to the
    /// supported range. Clears the selection.
    ///
    /// On error nothing changes: the old magnification and frame stay.
    pub fn set_cell_size(&mut self, cell_size: u32) -> Result<(), RasterError> {
        let cell_size = self.snap_cell_size(cell_size);
        if cell_size == self.cell_size {
            return Ok(());
        }
        if let Some(snap) = self.snapshot.as_ref() {
            render_into(snap, cell_size, self.mode, &mut self.frame)?;
            self.generation += 1;
        }
        self.cell_size = cell_size;
        self.selected = None;
        Ok(())
    }

    pub fn zoom_in(&mut self) -> Result<(), RasterError> {
        self.set_cell_size(self.cell_size.saturating_add(self.zoom_step))
    }

    pub fn zoom_out(&mut self) -> Result<(), RasterError> {
        self.set_cell_size(self.cell_size.saturating_sub(self.zoom_step))
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) -> Result<(), RasterError> {
        if mode == self.mode {
            return Ok(());
        }
        if let Some(snap) = self.snapshot.as_ref() {
            render_into(snap, self.cell_size, mode, &mut self.frame)?;
            self.generation += 1;
        }
        self.mode = mode;
        Ok(())
    }

    pub fn toggle_color_mode(&mut self) -> Result<(), RasterError> {
        self.set_color_mode(self.mode.toggled())
    }

    /// Select the cell under pixel `(px, py)` of the current frame.
    ///
    /// Returns `None` (and keeps the previous selection) when there is no grid
    /// or the pixel lies outside the rendered area.
    pub fn select_at(&mut self, px: u32, py: u32) -> Option<SelectedCell> {
        let sel = self.resolve(px, py)?;
        self.selected = Some(sel);
        Some(sel)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn resolve(&self, px: u32, py: u32) -> Option<SelectedCell> {
        let snap = self.snapshot.as_ref()?;
        let (x, y) = (px as usize, py as usize);
        if x >= self.frame.width() || y >= self.frame.height() {
            return None;
        }
        let index = pixel_to_cell_index(x, y, snap.width, self.cell_size);
        snap.cell(index).map(|cell_code| SelectedCell {
            cell_code,
            screen_x: px,
            screen_y: py,
        })
    }

    fn snap_cell_size(&self, cell_size: u32) -> u32 {
        let step = self.zoom_step;
        let cell_size = cell_size.clamp(MIN_CELL_SIZE.max(step), MAX_CELL_SIZE);
        cell_size - cell_size % step
    }
}

fn clamp_cell_size(cell_size: u32) -> u32 {
    cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE)
}
