//! Engine — the scene sequencer.
//!
//! Drives a validated `Show` one frame at a time: intro segments in order,
//! then the title screen, then idle. Every side effect goes through the
//! `Stage`, so a frame is fully issued before the host yields to the clock.
//!
//! Per frame, in this order:
//! 1. issue the current scene's per-frame effects (scroll, prompt blink)
//! 2. poll input once
//! 3. take at most one transition, running the new scene's entry effects

pub mod blink;
pub mod layout;
pub mod scroll;
pub mod source;
pub mod stage;

use log::{debug, info, warn};

use crate::types::{AudioSink, Buttons, FrameClock, InputSource, RenderSink, Surface};
use layout::{LayoutCursor, wrap};
use scroll::ScrollTimer;
use source::Show;
use stage::{Stage, TileCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Intro { segment: usize },
    Title,
    /// The title was dismissed. Nothing follows yet; the engine holds here.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Entered(State),
}

pub struct Sequencer<R> {
    show: Show,
    stage: Stage<R>,
    state: State,
    started: bool,
    frame: u64,
    scene_frame: u32,
    cursor: LayoutCursor,
    scroll: ScrollTimer,
    scroll_offset: i32,
    prompt_shown: Option<bool>,
}

impl<R: RenderSink> Sequencer<R> {
    pub fn new(show: Show, sink: R) -> Self {
        let cursor = LayoutCursor::new(show.text.start_row, show.text.row_pitch);
        Sequencer {
            show,
            stage: Stage::new(sink, TileCursor::default()),
            state: State::Intro { segment: 0 },
            started: false,
            frame: 0,
            scene_frame: 0,
            cursor,
            scroll: ScrollTimer::still(),
            scroll_offset: 0,
            prompt_shown: None,
        }
    }

    pub fn show(&self) -> &Show {
        &self.show
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Frames completed since the presentation started.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames completed since the current state was entered.
    pub fn scene_frame(&self) -> u32 {
        self.scene_frame
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    pub fn layout_row(&self) -> u16 {
        self.cursor.row()
    }

    pub fn stage(&self) -> &Stage<R> {
        &self.stage
    }

    pub fn sink(&self) -> &R {
        self.stage.sink()
    }

    pub fn sink_mut(&mut self) -> &mut R {
        self.stage.sink_mut()
    }

    pub fn into_sink(self) -> R {
        self.stage.into_sink()
    }

    /// Load the text palette, start the music and enter the first segment.
    /// Does nothing when already started.
    pub fn start<A: AudioSink>(&mut self, audio: &mut A) {
        if self.started {
            return;
        }
        if let Some(track) = &self.show.music {
            info!("starting looping track {}", track.name);
            audio.start_looping_track(track);
        }
        self.begin();
    }

    fn begin(&mut self) {
        self.started = true;
        self.stage
            .load_text_palette(self.show.text.palette, &self.show.text.style);
        self.enter(State::Intro { segment: 0 });
    }

    /// Run one frame: per-frame effects, one input poll, at most one
    /// transition.
    pub fn tick<I: InputSource>(&mut self, input: &mut I) -> Transition {
        if !self.started {
            warn!("tick before start; entering the intro without music");
            self.begin();
        }

        self.render_frame();
        let buttons = input.poll_buttons(self.show.controller);
        let transition = self.advance(buttons);

        self.frame += 1;
        match transition {
            Transition::Entered(_) => self.scene_frame = 0,
            Transition::Stay => self.scene_frame = self.scene_frame.saturating_add(1),
        }
        transition
    }

    /// Start, then tick and yield until `limit` frames have run. Without a
    /// limit this never returns, as the engine holds in `Idle` forever.
    pub fn run<A, I, C>(&mut self, audio: &mut A, input: &mut I, clock: &mut C, limit: Option<u64>) -> u64
    where
        A: AudioSink,
        I: InputSource,
        C: FrameClock,
    {
        self.start(audio);
        while limit.is_none_or(|limit| self.frame < limit) {
            self.tick(input);
            clock.wait_for_next_frame();
        }
        self.frame
    }

    fn render_frame(&mut self) {
        match self.state {
            State::Intro { .. } => {
                let offset = self.scroll.offset(self.scene_frame);
                if offset != self.scroll_offset {
                    self.stage.scroll_text(offset);
                    self.scroll_offset = offset;
                }
            }
            State::Title => {
                let visible = self.show.title.blink.visible(self.scene_frame);
                if self.prompt_shown != Some(visible) {
                    let prompt = &self.show.title.prompt;
                    if visible {
                        self.stage.draw_line(&prompt.text, prompt.column, prompt.row);
                    } else {
                        // Only the prompt's own footprint.
                        self.stage
                            .clear_region(prompt.column, prompt.row, prompt.width(), 1);
                    }
                    self.prompt_shown = Some(visible);
                }
            }
            State::Idle => {}
        }
    }

    fn advance(&mut self, buttons: Buttons) -> Transition {
        let skip = buttons.intersects(self.show.skip);
        let next = match self.state {
            State::Intro { segment } => {
                if skip {
                    info!("intro skipped at frame {} (segment {segment})", self.frame);
                    Some(State::Title)
                } else if self.scene_frame.saturating_add(1) >= self.show.segments[segment].budget {
                    if segment + 1 < self.show.segments.len() {
                        Some(State::Intro {
                            segment: segment + 1,
                        })
                    } else {
                        Some(State::Title)
                    }
                } else {
                    None
                }
            }
            State::Title => skip.then_some(State::Idle),
            State::Idle => None,
        };

        match next {
            Some(state) => {
                self.enter(state);
                Transition::Entered(state)
            }
            None => Transition::Stay,
        }
    }

    fn enter(&mut self, state: State) {
        self.state = state;
        match state {
            State::Intro { segment } => self.enter_intro(segment),
            State::Title => self.enter_title(),
            State::Idle => info!("title dismissed at frame {}; holding", self.frame),
        }
    }

    fn enter_intro(&mut self, index: usize) {
        let segment = &self.show.segments[index];
        info!(
            "intro segment {index} `{}` over {} for {} frames, at frame {}",
            segment.name, segment.background.name, segment.budget, self.frame
        );

        self.stage.reset_scene();
        self.stage
            .bind_image(Surface::Background, &segment.background, self.show.intro_palette);

        let width = self.show.text.width;
        self.cursor.reset();
        for line in wrap(width, segment.lines.iter().map(String::as_str)) {
            let row = self.cursor.next_row();
            if line.is_blank() {
                continue;
            }
            let pad = u16::try_from(line.left_pad(width)).unwrap_or(u16::MAX);
            self.stage
                .draw_line(&line.text, self.show.text.column.saturating_add(pad), row);
        }
        debug!("laid out segment {index} down to row {}", self.cursor.row());

        self.scroll = ScrollTimer::new(
            &segment.scroll,
            Some(segment.budget),
            self.show.scroll_extent(segment),
        );
        self.scroll_offset = self.scroll.offset(0);
        self.stage.scroll_text(self.scroll_offset);
    }

    fn enter_title(&mut self) {
        let title = &self.show.title;
        info!("title screen at frame {}", self.frame);

        self.stage.reset_scene();
        self.stage
            .bind_image(Surface::Background, &title.background, title.palette);
        if let Some(art) = &title.foreground {
            self.stage
                .bind_image(Surface::Foreground, art, title.foreground_palette);
        }

        self.cursor.reset();
        self.scroll = ScrollTimer::still();
        self.scroll_offset = 0;
        self.stage.scroll_text(0);
        self.prompt_shown = None;
    }
}
