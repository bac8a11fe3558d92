//! Renderer — a terminal-backed `RenderSink`.
//!
//! Keeps the three surfaces as plain data, composites them onto a fixed-size
//! cell grid on demand, and hands out cell-level diffs against the grid it
//! handed out last time. It knows nothing about scenes or timing.

use log::trace;

use crate::engine::source::TILE_PX;
use crate::types::{
    Axis, Cell, CellChange, ImageAsset, RenderSink, Style, Surface, TerminalContract,
};

/// Width of the text plane in cells. Writes past it are dropped.
pub const TEXT_PLANE_COLUMNS: usize = 64;

#[derive(Debug, Clone, Default)]
struct Layer {
    image: Option<ImageAsset>,
    /// Text rows, `' '` is transparent. Only used by the text surface.
    rows: Vec<Vec<char>>,
    scroll_x: i32,
    scroll_y: i32,
}

impl Layer {
    fn clear(&mut self) {
        self.image = None;
        self.rows.clear();
    }

    fn row_mut(&mut self, row: usize) -> &mut Vec<char> {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, vec![' '; TEXT_PLANE_COLUMNS]);
        }
        &mut self.rows[row]
    }

    /// Plane cell shown at screen position (x, y), after scrolling.
    fn text_at(&self, x: usize, y: usize) -> Option<char> {
        let px = x as i64 + i64::from(self.scroll_x).div_euclid(i64::from(TILE_PX));
        let py = y as i64 + i64::from(self.scroll_y).div_euclid(i64::from(TILE_PX));
        let (px, py) = (usize::try_from(px).ok()?, usize::try_from(py).ok()?);
        let ch = *self.rows.get(py)?.get(px)?;
        (ch != ' ').then_some(ch)
    }
}

pub struct TerminalSink {
    contract: TerminalContract,
    background: Layer,
    foreground: Layer,
    text: Layer,
    text_style: Style,
    shown: Vec<Vec<Cell>>,
}

impl TerminalSink {
    pub fn new(contract: TerminalContract) -> Self {
        let shown = blank_grid(&contract);
        TerminalSink {
            contract,
            background: Layer::default(),
            foreground: Layer::default(),
            text: Layer::default(),
            text_style: Style::default(),
            shown,
        }
    }

    pub fn contract(&self) -> &TerminalContract {
        &self.contract
    }

    /// The grid as of the last `take_changes`.
    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.shown
    }

    /// Composite the surfaces and return what changed since the last call.
    pub fn take_changes(&mut self) -> Vec<CellChange> {
        let grid = self.compose();
        let changes = diff(&self.shown, &grid);
        self.shown = grid;
        changes
    }

    /// Forget what was shown, so the next `take_changes` repaints every
    /// non-blank cell.
    pub fn invalidate(&mut self) {
        self.shown = blank_grid(&self.contract);
    }

    /// Rasterize background, foreground and text, back to front.
    pub fn compose(&self) -> Vec<Vec<Cell>> {
        let mut grid = blank_grid(&self.contract);
        paint_image(&mut grid, &self.background, CaptionRow::Bottom);
        paint_image(&mut grid, &self.foreground, CaptionRow::UpperThird);

        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if let Some(ch) = self.text.text_at(x, y) {
                    let mut style = self.text_style.clone();
                    if style.bg.is_none() {
                        style.bg = cell.style.bg.clone();
                    }
                    *cell = Cell { ch, style };
                }
            }
        }
        grid
    }

    fn layer_mut(&mut self, surface: Surface) -> &mut Layer {
        match surface {
            Surface::Background => &mut self.background,
            Surface::Foreground => &mut self.foreground,
            Surface::Text => &mut self.text,
        }
    }
}

impl RenderSink for TerminalSink {
    fn load_text_palette(&mut self, palette: u8, style: &Style) {
        trace!("text palette {palette}: {style:?}");
        self.text_style = style.clone();
    }

    fn bind_full_screen_image(
        &mut self,
        surface: Surface,
        image: &ImageAsset,
        palette: u8,
        first_tile: u16,
    ) {
        trace!("{} -> {surface:?} palette {palette} tile {first_tile}", image.name);
        self.layer_mut(surface).image = Some(image.clone());
    }

    fn clear_surface(&mut self, surface: Surface) {
        self.layer_mut(surface).clear();
    }

    fn draw_text_line(&mut self, surface: Surface, text: &str, column: u16, row: u16) {
        let row = self.layer_mut(surface).row_mut(usize::from(row));
        for (i, ch) in text.chars().enumerate() {
            match row.get_mut(usize::from(column) + i) {
                Some(cell) => *cell = ch,
                None => break,
            }
        }
    }

    fn clear_text_region(&mut self, surface: Surface, column: u16, row: u16, width: u16, rows: u16) {
        let layer = self.layer_mut(surface);
        for r in usize::from(row)..usize::from(row) + usize::from(rows) {
            let Some(line) = layer.rows.get_mut(r) else {
                break;
            };
            let start = usize::from(column).min(line.len());
            let end = (usize::from(column) + usize::from(width)).min(line.len());
            line[start..end].fill(' ');
        }
    }

    fn set_layer_scroll_offset(&mut self, surface: Surface, axis: Axis, pixels: i32) {
        let layer = self.layer_mut(surface);
        match axis {
            Axis::Horizontal => layer.scroll_x = pixels,
            Axis::Vertical => layer.scroll_y = pixels,
        }
    }
}

fn blank_grid(contract: &TerminalContract) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); contract.width as usize]; contract.height as usize]
}

#[derive(Debug, Clone, Copy)]
enum CaptionRow {
    Bottom,
    UpperThird,
}

/// Fill the grid with an image's look, then center its caption.
fn paint_image(grid: &mut [Vec<Cell>], layer: &Layer, caption_row: CaptionRow) {
    let Some(image) = &layer.image else {
        return;
    };
    let look = &image.look;
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);

    if look.fill != ' ' || look.style.bg.is_some() {
        for row in grid.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Cell {
                    ch: look.fill,
                    style: look.style.clone(),
                };
            }
        }
    }

    let Some(caption) = &look.caption else {
        return;
    };
    let y = match caption_row {
        CaptionRow::Bottom => height.saturating_sub(2),
        CaptionRow::UpperThird => height / 3,
    };
    let Some(row) = grid.get_mut(y) else {
        return;
    };
    let len = caption.chars().count().min(width);
    let x0 = (width - len) / 2;
    for (i, ch) in caption.chars().take(len).enumerate() {
        let cell = &mut row[x0 + i];
        let mut style = look.style.clone();
        if style.bg.is_none() {
            style.bg = cell.style.bg.clone();
        }
        *cell = Cell { ch, style };
    }
}

/// Compute a cell-level diff between two grids.
fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: next_cell.clone(),
                });
            }
        }
    }
    changes
}
