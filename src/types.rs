//! Shared boundary types for the title sequence.
//!
//! This module defines the contracts between the engine and the things it
//! drives but does not implement:
//! - Engine → display: `RenderSink`, addressed by `Surface` and `Axis`
//! - Engine → audio: `AudioSink`
//! - Host → engine: `InputSource` (a `Buttons` mask) and `FrameClock`
//!
//! Every collaborator call is fire-and-forget. None of them return errors;
//! a backend that can fail must buffer and report at the host level.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && !self.bold && !self.dim
    }
}

// ---------------------------------------------------------------------------
// Display addressing
// ---------------------------------------------------------------------------

/// One of the layers the display composites, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Full-screen background art.
    Background,
    /// Composited art drawn over the background (title logo, characters).
    Foreground,
    /// The text layer. This is the one that scrolls.
    Text,
}

impl Surface {
    pub const ALL: [Surface; 3] = [Surface::Background, Surface::Foreground, Surface::Text];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// How a backend without real image data should draw an image: a fill
/// character with a style, and an optional caption centered on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Look {
    #[serde(default = "default_fill")]
    pub fill: char,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

fn default_fill() -> char {
    ' '
}

impl Default for Look {
    fn default() -> Self {
        Look {
            fill: default_fill(),
            style: Style::default(),
            caption: None,
        }
    }
}

/// A full-screen image as the engine sees it: a name, the number of tiles
/// it occupies in tile memory, and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub name: String,
    pub tiles: u16,
    #[serde(default)]
    pub look: Look,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// Pad state as returned by one poll. Bit layout follows the 6-button pad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u16 {
        const UP    = 0x0001;
        const DOWN  = 0x0002;
        const LEFT  = 0x0004;
        const RIGHT = 0x0008;
        const B     = 0x0010;
        const C     = 0x0020;
        const A     = 0x0040;
        const START = 0x0080;
        const Z     = 0x0100;
        const Y     = 0x0200;
        const X     = 0x0400;
        const MODE  = 0x0800;
    }
}

/// Button names as they appear in show files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonName {
    A,
    B,
    C,
    X,
    Y,
    Z,
    #[default]
    Start,
    Mode,
}

impl From<ButtonName> for Buttons {
    fn from(name: ButtonName) -> Self {
        match name {
            ButtonName::A => Buttons::A,
            ButtonName::B => Buttons::B,
            ButtonName::C => Buttons::C,
            ButtonName::X => Buttons::X,
            ButtonName::Y => Buttons::Y,
            ButtonName::Z => Buttons::Z,
            ButtonName::Start => Buttons::START,
            ButtonName::Mode => Buttons::MODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    #[default]
    One,
    Two,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The display. Offsets passed to `set_layer_scroll_offset` are in pixels;
/// a positive vertical offset moves the layer's content up the screen.
pub trait RenderSink {
    fn load_text_palette(&mut self, palette: u8, style: &Style);
    fn bind_full_screen_image(
        &mut self,
        surface: Surface,
        image: &ImageAsset,
        palette: u8,
        first_tile: u16,
    );
    fn clear_surface(&mut self, surface: Surface);
    fn draw_text_line(&mut self, surface: Surface, text: &str, column: u16, row: u16);
    fn clear_text_region(&mut self, surface: Surface, column: u16, row: u16, width: u16, rows: u16);
    fn set_layer_scroll_offset(&mut self, surface: Surface, axis: Axis, pixels: i32);
}

pub trait AudioSink {
    fn start_looping_track(&mut self, track: &TrackRef);
}

pub trait InputSource {
    /// Read the current pad state. Called exactly once per frame.
    fn poll_buttons(&mut self, controller: Controller) -> Buttons;
}

pub trait FrameClock {
    /// Block until the next display refresh.
    fn wait_for_next_frame(&mut self);
}

// ---------------------------------------------------------------------------
// Terminal grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Style::is_default")]
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}
