//! Player — the terminal host.
//!
//! Supplies the collaborators the sequencer needs from a terminal: keyboard
//! input mapped to pad buttons, a 60 Hz frame clock, a sink that renders to
//! cells, and an audio sink that only logs. Then runs frames until quit.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::{cursor, event, execute, queue, style, terminal};
use log::{info, warn};

use crate::engine::source::{FRAME_RATE, Show};
use crate::engine::{Sequencer, State};
use crate::menubar::print_hint_bar;
use crate::renderer::TerminalSink;
use crate::types::{
    AudioSink, Buttons, CellChange, Color, Controller, FrameClock, InputSource, NamedColor, Style,
    TerminalContract, TrackRef,
};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

const HINTS: &[&str] = &[
    "[Enter][Space] skip",
    "[a][b][c][x][y][z] buttons",
    "[m] mode",
    "[q][Esc] quit",
];

pub struct Player {
    show: Show,
}

impl Player {
    pub fn new(show: Show) -> Self {
        Self { show }
    }

    /// Play the show in the terminal.
    ///
    /// Sets up the terminal, runs frames until `q`/`Esc`, and restores the
    /// terminal on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let need_w = self.show.screen.columns;
        let need_h = self.show.screen.rows;
        // +2: one row for menu bar, one row for status bar
        if term_w < need_w || term_h < need_h + 2 {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                need_w,
                need_h + 2,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let contract = TerminalContract {
            width: self.show.screen.columns,
            height: self.show.screen.rows,
        };
        let mut sequencer = Sequencer::new(self.show.clone(), TerminalSink::new(contract));
        let mut keyboard = Keyboard::new(self.show.skip);
        let mut clock = Pacer::new(FRAME_RATE);
        let mut audio = LoggedAudio;

        render_menubar(stdout)?;
        sequencer.start(&mut audio);

        while !keyboard.quit {
            sequencer.tick(&mut keyboard);
            if let Some(e) = keyboard.error.take() {
                return Err(e.into());
            }

            if keyboard.resized {
                keyboard.resized = false;
                queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                render_menubar(stdout)?;
                sequencer.sink_mut().invalidate();
            }

            let changes = sequencer.sink_mut().take_changes();
            render_changes(stdout, &changes)?;
            render_status(stdout, &sequencer)?;

            clock.wait_for_next_frame();
        }

        info!("quit at frame {}", sequencer.frame());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Keyboard as a pad. A key press seen during a frame counts as held for
/// that frame; terminals do not report releases reliably.
///
/// Answers for whichever controller the show reads. Enter and Space press
/// the show's skip buttons along with START.
#[derive(Default)]
struct Keyboard {
    skip: Buttons,
    quit: bool,
    resized: bool,
    error: Option<io::Error>,
}

impl Keyboard {
    fn new(skip: Buttons) -> Self {
        Keyboard {
            skip,
            ..Default::default()
        }
    }

    fn drain(&mut self) -> io::Result<Buttons> {
        let mut buttons = Buttons::empty();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                event::Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    match key.code {
                        event::KeyCode::Char('q') | event::KeyCode::Esc => self.quit = true,
                        code => buttons |= key_buttons(code, self.skip),
                    }
                }
                event::Event::Resize(_, _) => self.resized = true,
                _ => {}
            }
        }
        Ok(buttons)
    }
}

fn key_buttons(code: event::KeyCode, skip: Buttons) -> Buttons {
    use event::KeyCode::*;
    match code {
        Enter | Char(' ') => Buttons::START | skip,
        Char('a') => Buttons::A,
        Char('b') => Buttons::B,
        Char('c') => Buttons::C,
        Char('x') => Buttons::X,
        Char('y') => Buttons::Y,
        Char('z') => Buttons::Z,
        Char('m') => Buttons::MODE,
        Up => Buttons::UP,
        Down => Buttons::DOWN,
        Left => Buttons::LEFT,
        Right => Buttons::RIGHT,
        _ => Buttons::empty(),
    }
}

impl InputSource for Keyboard {
    fn poll_buttons(&mut self, _controller: Controller) -> Buttons {
        match self.drain() {
            Ok(buttons) => buttons,
            Err(e) => {
                self.error = Some(e);
                Buttons::empty()
            }
        }
    }
}

/// Sleeps to a fixed frame rate. Late frames are not caught up.
struct Pacer {
    period: Duration,
    next: Instant,
}

impl Pacer {
    fn new(rate: u32) -> Self {
        let period = Duration::from_secs(1) / rate.max(1);
        Self {
            period,
            next: Instant::now() + period,
        }
    }
}

impl FrameClock for Pacer {
    fn wait_for_next_frame(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.next = now + self.period;
        }
    }
}

struct LoggedAudio;

impl AudioSink for LoggedAudio {
    fn start_looping_track(&mut self, track: &TrackRef) {
        warn!("no audio output in the terminal; `{}` stays silent", track.name);
    }
}

// ---------------------------------------------------------------------------
// Terminal output
// ---------------------------------------------------------------------------

fn render_menubar(stdout: &mut io::Stdout) -> Result<()> {
    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
    )?;
    print_hint_bar(stdout, HINTS)?;
    stdout.flush()?;
    Ok(())
}

fn render_changes(stdout: &mut io::Stdout, changes: &[CellChange]) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }
    for change in changes {
        let cs = style::ContentStyle::from(&change.cell.style);
        queue!(
            stdout,
            cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
            style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
        )?;
    }
    stdout.flush()?;
    Ok(())
}

fn render_status(stdout: &mut io::Stdout, sequencer: &Sequencer<TerminalSink>) -> Result<()> {
    let status_y = sequencer.sink().contract().height + CANVAS_OFFSET;
    let (_, term_h) = terminal::size()?;
    if status_y >= term_h {
        return Ok(()); // No room for status bar.
    }

    let scene = match sequencer.state() {
        State::Intro { segment } => {
            let show = sequencer.show();
            format!(
                "intro {}/{} `{}` {}/{}",
                segment + 1,
                show.segments.len(),
                show.segments[segment].name,
                sequencer.scene_frame(),
                show.segments[segment].budget,
            )
        }
        State::Title => "title".to_string(),
        State::Idle => "idle".to_string(),
    };
    let status = format!(" Frame {} | {scene} ", sequencer.frame());

    let mut cs = style::ContentStyle::default();
    cs.attributes.set(style::Attribute::Dim);

    queue!(
        stdout,
        cursor::MoveTo(0, status_y),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::PrintStyledContent(style::StyledContent::new(cs, status)),
    )?;
    stdout.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

impl From<&Style> for style::ContentStyle {
    fn from(s: &Style) -> Self {
        let mut cs = style::ContentStyle {
            foreground_color: s.fg.as_ref().map(style::Color::from),
            background_color: s.bg.as_ref().map(style::Color::from),
            ..Default::default()
        };
        if s.bold {
            cs.attributes.set(style::Attribute::Bold);
        }
        if s.dim {
            cs.attributes.set(style::Attribute::Dim);
        }
        cs
    }
}

impl From<&Color> for style::Color {
    fn from(c: &Color) -> Self {
        match c {
            Color::Named(NamedColor::Black) => style::Color::Black,
            Color::Named(NamedColor::Red) => style::Color::DarkRed,
            Color::Named(NamedColor::Green) => style::Color::DarkGreen,
            Color::Named(NamedColor::Yellow) => style::Color::DarkYellow,
            Color::Named(NamedColor::Blue) => style::Color::DarkBlue,
            Color::Named(NamedColor::Magenta) => style::Color::DarkMagenta,
            Color::Named(NamedColor::Cyan) => style::Color::DarkCyan,
            Color::Named(NamedColor::White) => style::Color::Grey,
            &Color::Rgb { r, g, b } => style::Color::Rgb { r, g, b },
        }
    }
}
