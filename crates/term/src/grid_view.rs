//! GridView: maps the viewer's pixel buffer into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Each terminal cell shows one pixel column and two pixel rows, so terminal
//! cell `(col, row)` covers pixels `(ox + col, oy + 2 * row)` and the one below
//! it, where `(ox, oy)` is the pan origin.

use crate::core::{decode, format_elapsed, glyph, Census, Viewer};
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::types::{ColorMode, SelectedCell};

/// Canvas color behind transparent pixels.
pub const CANVAS_BACKGROUND: Rgb = Rgb::from_hex(0x65c399);

/// Pixel rows shown by one terminal row. Use it as the viewer's zoom step.
pub const PIXEL_ROWS_PER_CELL: u32 = 2;

const PANEL_W: u16 = 30;
const MIN_GRID_W: u16 = 8;
const STATUS_H: u16 = 1;
const HELP: &str =
    "q quit  n step  g fetch  a auto  r new  +/- zoom  m fade  arrows pan  click inspect";

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Shell state shown next to the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusView<'a> {
    pub endpoint: &'a str,
    pub autoplay: bool,
    pub last_error: Option<&'a str>,
    pub logs: &'a [String],
}

/// A terminal renderer for the forest grid.
#[derive(Debug, Clone, Default)]
pub struct GridView {
    origin_x: usize,
    origin_y: usize,
}

impl GridView {
    /// Pan origin in pixels.
    pub fn origin(&self) -> (usize, usize) {
        (self.origin_x, self.origin_y)
    }

    /// Terminal columns and rows used by the grid.
    pub fn grid_area(&self, viewport: Viewport) -> (u16, u16) {
        let w = if viewport.width >= PANEL_W + MIN_GRID_W {
            viewport.width - PANEL_W
        } else {
            viewport.width
        };
        (w, viewport.height.saturating_sub(STATUS_H))
    }

    /// Move the origin by whole cells, keeping as much of the grid on screen as possible.
    pub fn pan(&mut self, dx: isize, dy: isize, viewer: &Viewer, viewport: Viewport) {
        let step = viewer.cell_size() as isize;
        self.origin_x = self.origin_x.saturating_add_signed(dx * step);
        self.origin_y = self.origin_y.saturating_add_signed(dy * step);
        self.fit(viewer, viewport);
    }

    /// Clamp the origin after a zoom, resize or new grid.
    pub fn fit(&mut self, viewer: &Viewer, viewport: Viewport) {
        let (w, h) = self.grid_area(viewport);
        let frame = viewer.frame();
        self.origin_x = self.origin_x.min(frame.width().saturating_sub(w as usize));
        let rows = h as usize * PIXEL_ROWS_PER_CELL as usize;
        self.origin_y = self.origin_y.min(frame.height().saturating_sub(rows));
    }

    /// Top pixel under terminal cell `(column, row)`, if it lies on the rendered grid.
    ///
    /// Only the upper of the two pixel rows is reachable; keep the viewer's
    /// cell size a multiple of [`PIXEL_ROWS_PER_CELL`] so every grid row is.
    pub fn hit_test(
        &self,
        viewer: &Viewer,
        viewport: Viewport,
        column: u16,
        row: u16,
    ) -> Option<(u32, u32)> {
        let (w, h) = self.grid_area(viewport);
        if column >= w || row >= h {
            return None;
        }
        let px = self.origin_x + column as usize;
        let py = self.origin_y + row as usize * PIXEL_ROWS_PER_CELL as usize;
        let frame = viewer.frame();
        if px >= frame.width() || py >= frame.height() {
            return None;
        }
        Some((u32::try_from(px).ok()?, u32::try_from(py).ok()?))
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        viewer: &Viewer,
        status: &StatusView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        let (w, h) = self.grid_area(viewport);

        if viewer.snapshot().is_some() {
            self.draw_pixels(fb, viewer, w, h);
        } else {
            let dim = CellStyle::new(Rgb::new(140, 140, 140), Rgb::new(0, 0, 0));
            let hint = "no grid yet: press g to fetch or r to create";
            fb.put_str(1, h / 2, hint, w.saturating_sub(1), dim);
        }

        if w < viewport.width {
            self.draw_panel(fb, viewer, status, w + 1, viewport);
        }

        let help = CellStyle::new(Rgb::new(160, 160, 170), Rgb::new(25, 25, 35));
        let y = viewport.height.saturating_sub(1);
        for x in 0..viewport.width {
            fb.set(x, y, Cell { ch: ' ', style: help });
        }
        fb.put_str(0, y, HELP, viewport.width, help);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        viewer: &Viewer,
        status: &StatusView<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(viewer, status, viewport, &mut fb);
        fb
    }

    fn draw_pixels(&self, fb: &mut FrameBuffer, viewer: &Viewer, w: u16, h: u16) {
        let frame = viewer.frame();
        let outside = Rgb::new(0, 0, 0);
        let sample = |x: usize, y: usize| {
            frame
                .pixel(x, y)
                .map(|px| CANVAS_BACKGROUND.under(px))
                .unwrap_or(outside)
        };

        for row in 0..h {
            let py = self.origin_y + row as usize * PIXEL_ROWS_PER_CELL as usize;
            for col in 0..w {
                let px = self.origin_x + col as usize;
                fb.set(col, row, Cell::pixels(sample(px, py), sample(px, py + 1)));
            }
        }
    }

    fn draw_panel(
        &self,
        fb: &mut FrameBuffer,
        viewer: &Viewer,
        status: &StatusView<'_>,
        x: u16,
        viewport: Viewport,
    ) {
        let width = viewport.width.saturating_sub(x);
        let bottom = viewport.height.saturating_sub(STATUS_H);
        let mut panel = Panel {
            fb,
            x,
            y: 0,
            width,
            bottom,
        };

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let alert = CellStyle::new(Rgb::new(240, 110, 100), Rgb::new(0, 0, 0)).bold();

        panel.line("FOREST", label);
        panel.line(status.endpoint, value);
        panel.gap();

        match viewer.snapshot() {
            Some(snap) => {
                let census = Census::of(&snap.cells);
                panel.line(&format_elapsed(snap.months_elapsed), value);
                let yearly = format!("lumber {}  mauls {}", snap.yearly_lumber, snap.yearly_mauls);
                panel.line(&yearly, value);
                panel.line(&format!("trees {}", census.trees), value);
                panel.line(&format!("jacks {}", census.jacks), value);
                panel.line(&format!("bears {}", census.bears), value);
                panel.line(&format!("grid {}x{}", snap.width, snap.height), value);
            }
            None => panel.line("no grid", value),
        }
        panel.gap();

        let mode = match viewer.color_mode() {
            ColorMode::Opaque => "opaque",
            ColorMode::AgeFade => "fade",
        };
        panel.line("VIEW", label);
        panel.line(&format!("cell {}  {}", viewer.cell_size(), mode), value);
        let autoplay = if status.autoplay {
            "autoplay on"
        } else {
            "autoplay off"
        };
        panel.line(autoplay, value);
        panel.gap();

        panel.line("SELECTED", label);
        match viewer.selected() {
            Some(sel) => selection_lines(&mut panel, sel, value),
            None => panel.line("click a cell", value),
        }
        panel.gap();

        if let Some(err) = status.last_error {
            panel.line("ERROR", alert);
            panel.line(err, value);
            panel.gap();
        }

        let room = panel.bottom.saturating_sub(panel.y + 1) as usize;
        if room > 0 && !status.logs.is_empty() {
            panel.line("LOG", label);
            let skip = status.logs.len().saturating_sub(room);
            for line in &status.logs[skip..] {
                panel.line(line, value);
            }
        }
    }
}

fn selection_lines(panel: &mut Panel<'_>, sel: SelectedCell, style: CellStyle) {
    let d = decode(sel.cell_code);
    let header = format!(
        "{:#06x} '{}' at {},{}",
        sel.cell_code,
        glyph(sel.cell_code),
        sel.screen_x,
        sel.screen_y
    );
    panel.line(&header, style);
    let age = format!("tree age {} ({})", d.tree_age, d.tree_kind().as_str());
    panel.line(&age, style);
    panel.line(&format!("jack level {}", d.jack_level), style);
    panel.line(if d.bear { "bear yes" } else { "bear no" }, style);
}

struct Panel<'a> {
    fb: &'a mut FrameBuffer,
    x: u16,
    y: u16,
    width: u16,
    bottom: u16,
}

impl Panel<'_> {
    fn line(&mut self, text: &str, style: CellStyle) {
        if self.y < self.bottom {
            self.fb.put_str(self.x, self.y, text, self.width, style);
            self.y += 1;
        }
    }

    fn gap(&mut self) {
        self.y = self.y.saturating_add(1);
    }
}
