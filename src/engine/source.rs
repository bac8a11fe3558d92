//! Source show types — the human-authored show file.
//!
//! These types say *what* plays and *for how long*, not how it is drawn.
//! `SourceShow::validate` checks them once, up front, and produces a `Show`
//! the sequencer can run without any further error paths.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ButtonName, Buttons, Controller, ImageAsset, Style, TrackRef};

use super::blink::Blink;
use super::scroll::{ScrollConfig, ScrollSpeed};
use super::stage::TileCursor;

/// Display refresh rate the frame budgets are expressed in.
pub const FRAME_RATE: u32 = 60;
/// Side of one tile, in pixels.
pub const TILE_PX: u32 = 8;

const BUILTIN: &str = include_str!("../../shows/reims-en-rage.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("text width must be at least one column")]
    ZeroWidth,

    #[error("text row pitch must be at least one row")]
    ZeroRowPitch,

    #[error("intro has no segments")]
    NoSegments,

    #[error("total duration must be at least one frame")]
    ZeroDuration,

    #[error("image `{name}` is referenced but not declared")]
    UnknownImage { name: String },

    #[error("image `{name}` needs {tiles} tiles, tile memory holds {capacity}")]
    ImageTooLarge {
        name: String,
        tiles: u16,
        capacity: u16,
    },

    #[error("title art needs {tiles} tiles together, tile memory holds {capacity}")]
    TitleArtTooLarge { tiles: u32, capacity: u16 },

    #[error("segment `{segment}` has no frame budget while others do")]
    MissingBudget { segment: String },

    #[error("segment budgets sum to {sum} frames, total duration is {total}")]
    BudgetMismatch { sum: u64, total: u32 },

    #[error("segment `{segment}` gets a budget of zero frames")]
    ZeroBudget { segment: String },

    #[error("segment `{segment}` scrolls with a step period of zero")]
    ZeroStepPeriod { segment: String },

    #[error("blink on and off periods are both zero")]
    ZeroBlinkPeriod,

    #[error("prompt `{text}` at column {column}, row {row} does not fit on screen")]
    PromptOffScreen { text: String, column: u16, row: u16 },

    #[error("invalid show file")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Authored format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub columns: u16,
    pub rows: u16,
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            columns: 40,
            rows: 28,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    Frames(u32),
    Seconds(u32),
}

impl Duration {
    pub fn frames(self) -> u32 {
        match self {
            Duration::Frames(f) => f,
            Duration::Seconds(s) => s.saturating_mul(FRAME_RATE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Column budget every wrapped line must fit in.
    #[serde(default = "default_text_width")]
    pub width: usize,
    /// Left edge of the column budget on the text layer.
    #[serde(default = "default_text_column")]
    pub column: u16,
    #[serde(default = "default_start_row")]
    pub start_row: u16,
    /// Rows advanced per emitted line.
    #[serde(default = "default_row_pitch")]
    pub row_pitch: u16,
    #[serde(default = "default_text_palette")]
    pub palette: u8,
    #[serde(default)]
    pub style: Style,
}

fn default_text_width() -> usize {
    34
}

fn default_text_column() -> u16 {
    3
}

fn default_start_row() -> u16 {
    3
}

fn default_row_pitch() -> u16 {
    1
}

fn default_text_palette() -> u8 {
    1
}

fn default_image_palette() -> u8 {
    0
}

fn default_foreground_palette() -> u8 {
    2
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            width: default_text_width(),
            column: default_text_column(),
            start_row: default_start_row(),
            row_pitch: default_row_pitch(),
            palette: default_text_palette(),
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSource {
    pub name: String,
    pub background: String,
    pub lines: Vec<String>,
    /// Explicit budget. Either every segment has one or none does, in which
    /// case the total duration is split evenly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<u32>,
    /// Overrides the intro-wide scroll settings for this segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroSource {
    pub duration: Duration,
    #[serde(default = "default_image_palette")]
    pub palette: u8,
    #[serde(default)]
    pub scroll: ScrollConfig,
    pub segments: Vec<SegmentSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSource {
    pub text: String,
    /// Left column; centered on screen when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u16>,
    pub row: u16,
    #[serde(default = "default_blink_frames")]
    pub on_frames: u32,
    #[serde(default = "default_blink_frames")]
    pub off_frames: u32,
    #[serde(default)]
    pub start_hidden: bool,
}

fn default_blink_frames() -> u32 {
    16
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSource {
    pub background: String,
    #[serde(default = "default_image_palette")]
    pub palette: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default = "default_foreground_palette")]
    pub foreground_palette: u8,
    pub prompt: PromptSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub controller: Controller,
    #[serde(default)]
    pub skip: ButtonName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceShow {
    #[serde(default)]
    pub screen: Screen,
    pub images: Vec<ImageAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<TrackRef>,
    #[serde(default)]
    pub text: TextConfig,
    pub intro: IntroSource,
    pub title: TitleSource,
    #[serde(default)]
    pub input: InputConfig,
}

// ---------------------------------------------------------------------------
// Validated show
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub background: ImageAsset,
    pub lines: Vec<String>,
    pub budget: u32,
    pub scroll: ScrollConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub column: u16,
    pub row: u16,
}

impl Prompt {
    pub fn width(&self) -> u16 {
        u16::try_from(self.text.chars().count()).unwrap_or(u16::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub background: ImageAsset,
    pub palette: u8,
    pub foreground: Option<ImageAsset>,
    pub foreground_palette: u8,
    pub prompt: Prompt,
    pub blink: Blink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub screen: Screen,
    pub text: TextConfig,
    pub music: Option<TrackRef>,
    pub intro_palette: u8,
    pub total_frames: u32,
    pub segments: Vec<Segment>,
    pub title: Title,
    pub controller: Controller,
    pub skip: Buttons,
}

impl Show {
    pub fn segment_budgets(&self) -> Vec<u32> {
        self.segments.iter().map(|s| s.budget).collect()
    }

    /// Pixels for the text block of a segment to scroll fully off screen.
    pub fn scroll_extent(&self, segment: &Segment) -> u32 {
        let lines = super::layout::line_count(
            self.text.width,
            segment.lines.iter().map(String::as_str),
        );
        let rows = u32::try_from(lines)
            .unwrap_or(u32::MAX)
            .saturating_mul(u32::from(self.text.row_pitch));
        rows.saturating_add(u32::from(self.screen.rows))
            .saturating_mul(TILE_PX)
    }
}

impl SourceShow {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The Reims en Rage title sequence.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN)
    }

    pub fn validate(&self) -> Result<Show, ConfigError> {
        if self.text.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.text.row_pitch == 0 {
            return Err(ConfigError::ZeroRowPitch);
        }
        if self.intro.segments.is_empty() {
            return Err(ConfigError::NoSegments);
        }
        let total = self.intro.duration.frames();
        if total == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        let capacity = TileCursor::default().capacity();
        let budgets = split_budgets(&self.intro.segments, total)?;

        let mut segments = Vec::with_capacity(self.intro.segments.len());
        for (source, budget) in self.intro.segments.iter().zip(budgets) {
            let scroll = source
                .scroll
                .clone()
                .unwrap_or_else(|| self.intro.scroll.clone());
            if let ScrollSpeed::Stepped { step_period: 0, .. } = scroll.speed {
                return Err(ConfigError::ZeroStepPeriod {
                    segment: source.name.clone(),
                });
            }
            segments.push(Segment {
                name: source.name.clone(),
                background: self.image(&source.background, capacity)?,
                lines: source.lines.clone(),
                budget,
                scroll,
            });
        }

        let title = self.validate_title(capacity)?;

        debug!(
            "show validated: {} segments over {total} frames, budgets {:?}",
            segments.len(),
            segments.iter().map(|s| s.budget).collect::<Vec<_>>()
        );

        Ok(Show {
            screen: self.screen.clone(),
            text: self.text.clone(),
            music: self.music.clone(),
            intro_palette: self.intro.palette,
            total_frames: total,
            segments,
            title,
            controller: self.input.controller,
            skip: self.input.skip.into(),
        })
    }

    fn validate_title(&self, capacity: u16) -> Result<Title, ConfigError> {
        let background = self.image(&self.title.background, capacity)?;
        let foreground = self
            .title
            .foreground
            .as_deref()
            .map(|name| self.image(name, capacity))
            .transpose()?;

        let tiles = u32::from(background.tiles)
            + foreground.as_ref().map_or(0, |f| u32::from(f.tiles));
        if tiles > u32::from(capacity) {
            return Err(ConfigError::TitleArtTooLarge { tiles, capacity });
        }

        let source = &self.title.prompt;
        if source.on_frames == 0 && source.off_frames == 0 {
            return Err(ConfigError::ZeroBlinkPeriod);
        }
        let len = source.text.chars().count();
        let columns = usize::from(self.screen.columns);
        let column = source
            .column
            .unwrap_or_else(|| u16::try_from(columns.saturating_sub(len) / 2).unwrap_or(0));
        if usize::from(column) + len > columns || source.row >= self.screen.rows {
            return Err(ConfigError::PromptOffScreen {
                text: source.text.clone(),
                column,
                row: source.row,
            });
        }

        Ok(Title {
            background,
            palette: self.title.palette,
            foreground,
            foreground_palette: self.title.foreground_palette,
            prompt: Prompt {
                text: source.text.clone(),
                column,
                row: source.row,
            },
            blink: Blink::new(source.on_frames, source.off_frames, source.start_hidden),
        })
    }

    fn image(&self, name: &str, capacity: u16) -> Result<ImageAsset, ConfigError> {
        let image = self
            .images
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| ConfigError::UnknownImage { name: name.into() })?;
        if image.tiles > capacity {
            return Err(ConfigError::ImageTooLarge {
                name: image.name.clone(),
                tiles: image.tiles,
                capacity,
            });
        }
        Ok(image.clone())
    }
}

/// Per-segment budgets: explicit ones must sum to `total`; otherwise `total`
/// is divided evenly and the remainder goes to the last segment.
fn split_budgets(segments: &[SegmentSource], total: u32) -> Result<Vec<u32>, ConfigError> {
    let explicit: Vec<Option<u32>> = segments.iter().map(|s| s.frames).collect();

    let budgets = if explicit.iter().all(Option::is_none) {
        let n = u32::try_from(segments.len()).unwrap_or(u32::MAX);
        let share = total / n;
        let mut budgets = vec![share; segments.len()];
        if let Some(last) = budgets.last_mut() {
            *last += total - share * n;
        }
        budgets
    } else {
        let mut budgets = Vec::with_capacity(segments.len());
        for (segment, frames) in segments.iter().zip(&explicit) {
            match frames {
                Some(f) => budgets.push(*f),
                None => {
                    return Err(ConfigError::MissingBudget {
                        segment: segment.name.clone(),
                    });
                }
            }
        }
        let sum: u64 = budgets.iter().map(|&b| u64::from(b)).sum();
        if sum != u64::from(total) {
            return Err(ConfigError::BudgetMismatch { sum, total });
        }
        budgets
    };

    if let Some((segment, _)) = segments.iter().zip(&budgets).find(|(_, b)| **b == 0) {
        return Err(ConfigError::ZeroBudget {
            segment: segment.name.clone(),
        });
    }
    Ok(budgets)
}
