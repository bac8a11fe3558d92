//! Headless collaborators: a recording sink, scripted input, a clock that
//! does not sleep, and `trace`, which runs a show and returns every call the
//! engine made, stamped with the frame it happened in.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::Sequencer;
use crate::engine::source::Show;
use crate::types::{
    AudioSink, Axis, Buttons, Controller, FrameClock, ImageAsset, InputSource, RenderSink, Style,
    Surface, TrackRef,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SinkCall {
    StartTrack {
        track: String,
    },
    LoadTextPalette {
        palette: u8,
    },
    BindImage {
        surface: Surface,
        image: String,
        palette: u8,
        first_tile: u16,
    },
    ClearSurface {
        surface: Surface,
    },
    DrawText {
        surface: Surface,
        text: String,
        column: u16,
        row: u16,
    },
    ClearText {
        surface: Surface,
        column: u16,
        row: u16,
        width: u16,
        rows: u16,
    },
    Scroll {
        surface: Surface,
        axis: Axis,
        pixels: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub frame: u64,
    #[serde(flatten)]
    pub call: SinkCall,
}

/// Records every render and audio call.
#[derive(Debug, Default)]
pub struct Recorder {
    frame: u64,
    entries: Vec<TraceEntry>,
}

impl Recorder {
    /// Stamp subsequent calls with `frame`.
    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn calls(&self) -> impl Iterator<Item = &SinkCall> {
        self.entries.iter().map(|e| &e.call)
    }

    pub fn take(&mut self) -> Vec<TraceEntry> {
        std::mem::take(&mut self.entries)
    }

    fn push(&mut self, call: SinkCall) {
        self.entries.push(TraceEntry {
            frame: self.frame,
            call,
        });
    }
}

impl RenderSink for Recorder {
    fn load_text_palette(&mut self, palette: u8, _style: &Style) {
        self.push(SinkCall::LoadTextPalette { palette });
    }

    fn bind_full_screen_image(
        &mut self,
        surface: Surface,
        image: &ImageAsset,
        palette: u8,
        first_tile: u16,
    ) {
        self.push(SinkCall::BindImage {
            surface,
            image: image.name.clone(),
            palette,
            first_tile,
        });
    }

    fn clear_surface(&mut self, surface: Surface) {
        self.push(SinkCall::ClearSurface { surface });
    }

    fn draw_text_line(&mut self, surface: Surface, text: &str, column: u16, row: u16) {
        self.push(SinkCall::DrawText {
            surface,
            text: text.to_string(),
            column,
            row,
        });
    }

    fn clear_text_region(&mut self, surface: Surface, column: u16, row: u16, width: u16, rows: u16) {
        self.push(SinkCall::ClearText {
            surface,
            column,
            row,
            width,
            rows,
        });
    }

    fn set_layer_scroll_offset(&mut self, surface: Surface, axis: Axis, pixels: i32) {
        self.push(SinkCall::Scroll {
            surface,
            axis,
            pixels,
        });
    }
}

impl AudioSink for Recorder {
    fn start_looping_track(&mut self, track: &TrackRef) {
        self.push(SinkCall::StartTrack {
            track: track.name.clone(),
        });
    }
}

/// Input that holds the skip button on chosen frames. Each poll is one
/// frame, since the engine polls exactly once per frame.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    skip: Buttons,
    held: BTreeSet<u64>,
    polls: u64,
}

impl ScriptedInput {
    pub fn new(skip: Buttons) -> Self {
        ScriptedInput {
            skip,
            ..Default::default()
        }
    }

    pub fn hold_at(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.held.extend(frames);
        self
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputSource for ScriptedInput {
    fn poll_buttons(&mut self, _controller: Controller) -> Buttons {
        let held = self.held.contains(&self.polls);
        self.polls += 1;
        if held { self.skip } else { Buttons::empty() }
    }
}

/// A clock that only counts.
#[derive(Debug, Default)]
pub struct CountingClock {
    pub frames: u64,
}

impl FrameClock for CountingClock {
    fn wait_for_next_frame(&mut self) {
        self.frames += 1;
    }
}

/// Run `show` for `frames` frames, holding the skip button on each frame in
/// `skip_frames`, and return the full call log.
pub fn trace(show: Show, frames: u64, skip_frames: &[u64]) -> Vec<TraceEntry> {
    let mut input = ScriptedInput::new(show.skip).hold_at(skip_frames.iter().copied());
    let mut audio = Recorder::default();
    let mut sequencer = Sequencer::new(show, Recorder::default());

    sequencer.start(&mut audio);
    while sequencer.frame() < frames {
        let frame = sequencer.frame();
        sequencer.sink_mut().set_frame(frame);
        sequencer.tick(&mut input);
    }

    let mut entries = audio.take();
    entries.extend(sequencer.sink_mut().take());
    entries
}
