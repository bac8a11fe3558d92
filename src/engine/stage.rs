//! Render adapter: the sink plus the tile-memory cursor it allocates from.
//!
//! The cursor is the only mutable state shared across scenes. It advances on
//! every image bind and goes back to the first user tile on every scene
//! reset, so repeated scene switches never run tile memory dry.

use log::{debug, warn};

use crate::types::{Axis, ImageAsset, RenderSink, Style, Surface};

/// First tile index available to user art; the ones below hold the font.
pub const TILE_USER_INDEX: u16 = 16;
/// One past the last tile index available to user art.
pub const TILE_LIMIT: u16 = 1536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCursor {
    base: u16,
    limit: u16,
    next: u16,
}

impl TileCursor {
    pub fn new(base: u16, limit: u16) -> Self {
        TileCursor {
            base,
            limit,
            next: base,
        }
    }

    pub fn next(&self) -> u16 {
        self.next
    }

    pub fn capacity(&self) -> u16 {
        self.limit.saturating_sub(self.base)
    }

    /// Reserve `tiles` consecutive tiles and return the first index, or
    /// `None` when they do not fit below the limit.
    pub fn claim(&mut self, tiles: u16) -> Option<u16> {
        let end = self.next.checked_add(tiles)?;
        if end > self.limit {
            return None;
        }
        let first = self.next;
        self.next = end;
        Some(first)
    }

    pub fn reset(&mut self) {
        self.next = self.base;
    }
}

impl Default for TileCursor {
    fn default() -> Self {
        TileCursor::new(TILE_USER_INDEX, TILE_LIMIT)
    }
}

pub struct Stage<R> {
    sink: R,
    tiles: TileCursor,
}

impl<R: RenderSink> Stage<R> {
    pub fn new(sink: R, tiles: TileCursor) -> Self {
        Stage { sink, tiles }
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn into_sink(self) -> R {
        self.sink
    }

    pub fn tiles(&self) -> &TileCursor {
        &self.tiles
    }

    pub fn load_text_palette(&mut self, palette: u8, style: &Style) {
        self.sink.load_text_palette(palette, style);
    }

    /// Wipe every surface and hand tile memory back from the start.
    pub fn reset_scene(&mut self) {
        for surface in Surface::ALL {
            self.sink.clear_surface(surface);
        }
        debug!("tile cursor reset from {} to {}", self.tiles.next(), TILE_USER_INDEX);
        self.tiles.reset();
    }

    pub fn bind_image(&mut self, surface: Surface, image: &ImageAsset, palette: u8) {
        match self.tiles.claim(image.tiles) {
            Some(first_tile) => {
                debug!(
                    "bind {} on {surface:?}: tiles {first_tile}..{}",
                    image.name,
                    self.tiles.next()
                );
                self.sink
                    .bind_full_screen_image(surface, image, palette, first_tile);
            }
            None => warn!(
                "tile memory exhausted binding {} ({} tiles at {})",
                image.name,
                image.tiles,
                self.tiles.next()
            ),
        }
    }

    pub fn draw_line(&mut self, text: &str, column: u16, row: u16) {
        self.sink.draw_text_line(Surface::Text, text, column, row);
    }

    pub fn clear_region(&mut self, column: u16, row: u16, width: u16, rows: u16) {
        self.sink
            .clear_text_region(Surface::Text, column, row, width, rows);
    }

    pub fn scroll_text(&mut self, pixels: i32) {
        self.sink
            .set_layer_scroll_offset(Surface::Text, Axis::Vertical, pixels);
    }
}
