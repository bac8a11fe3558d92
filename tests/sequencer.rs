use pretty_assertions::assert_eq;

use rage_intro::engine::source::{Show, SourceShow};
use rage_intro::engine::{Sequencer, State, Transition};
use rage_intro::headless::{CountingClock, Recorder, ScriptedInput, SinkCall, TraceEntry, trace};
use rage_intro::types::{Axis, Buttons, Surface};

/// Three 10-frame segments, 1px per frame upward scroll, a 4-on 4-off prompt.
const SMALL: &str = r#"{
    "images": [
        { "name": "a", "tiles": 600 },
        { "name": "b", "tiles": 700 },
        { "name": "c", "tiles": 800 },
        { "name": "title", "tiles": 900 },
        { "name": "logo", "tiles": 200 }
    ],
    "music": { "name": "intro_music" },
    "text": { "width": 10, "column": 3, "start_row": 4, "row_pitch": 2 },
    "intro": {
        "duration": { "frames": 30 },
        "scroll": { "speed": { "mode": "stepped", "step_pixels": 1, "step_period": 1 } },
        "segments": [
            { "name": "one", "background": "a", "lines": ["AB CD", "", "EFGHIJKLMNOPQRSTUVWXYZABCDEFGHIJ"] },
            { "name": "two", "background": "b", "lines": ["hello"] },
            { "name": "three", "background": "c", "lines": ["bye"] }
        ]
    },
    "title": {
        "background": "title",
        "foreground": "logo",
        "prompt": { "text": "PRESS  START", "row": 25, "on_frames": 4, "off_frames": 4 }
    }
}"#;

fn small() -> Show {
    SourceShow::from_json(SMALL).unwrap().validate().unwrap()
}

fn ninety_seconds() -> Show {
    let mut source = SourceShow::from_json(SMALL).unwrap();
    source.intro.duration = rage_intro::engine::source::Duration::Seconds(90);
    source.validate().unwrap()
}

fn started(show: Show) -> (Sequencer<Recorder>, Recorder) {
    let mut audio = Recorder::default();
    let mut sequencer = Sequencer::new(show, Recorder::default());
    sequencer.start(&mut audio);
    (sequencer, audio)
}

fn frames_where(entries: &[TraceEntry], pred: impl Fn(&SinkCall) -> bool) -> Vec<u64> {
    entries
        .iter()
        .filter(|e| pred(&e.call))
        .map(|e| e.frame)
        .collect()
}

#[test]
fn segments_run_to_budget_then_title() {
    let (mut sequencer, _) = started(small());
    let mut input = ScriptedInput::new(Buttons::START);

    let mut entered = Vec::new();
    for _ in 0..40 {
        let frame = sequencer.frame();
        if let Transition::Entered(state) = sequencer.tick(&mut input) {
            entered.push((frame, state));
        }
    }

    assert_eq!(
        entered,
        vec![
            (9, State::Intro { segment: 1 }),
            (19, State::Intro { segment: 2 }),
            (29, State::Title),
        ]
    );
    assert_eq!(sequencer.state(), State::Title);
    assert_eq!(sequencer.scene_frame(), 10);
    assert_eq!(input.polls(), 40);
}

#[test]
fn skip_mid_segment_enters_title_the_same_frame() {
    let (mut sequencer, _) = started(ninety_seconds());
    assert_eq!(sequencer.show().segment_budgets(), vec![1800, 1800, 1800]);
    let mut input = ScriptedInput::new(Buttons::START).hold_at([500]);

    for _ in 0..500 {
        assert_eq!(sequencer.tick(&mut input), Transition::Stay);
    }
    assert_eq!(sequencer.state(), State::Intro { segment: 0 });
    assert_eq!(sequencer.scene_frame(), 500);
    assert_eq!(sequencer.scroll_offset(), 499);
    assert_eq!(sequencer.layout_row(), 10);

    assert_eq!(sequencer.tick(&mut input), Transition::Entered(State::Title));
    assert_eq!(sequencer.state(), State::Title);
    assert_eq!(sequencer.frame(), 501);
    assert_eq!(sequencer.scene_frame(), 0);
    assert_eq!(sequencer.scroll_offset(), 0);
    assert_eq!(sequencer.layout_row(), 4);
}

#[test]
fn skip_on_a_boundary_frame_goes_to_title() {
    let entries = trace(small(), 12, &[9]);
    let binds: Vec<(u64, String)> = entries
        .iter()
        .filter_map(|e| match &e.call {
            SinkCall::BindImage { image, .. } => Some((e.frame, image.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        binds,
        vec![(0, "a".into()), (9, "title".into()), (9, "logo".into())]
    );
}

#[test]
fn held_skip_dismisses_intro_then_title() {
    let (mut sequencer, _) = started(small());
    let mut input = ScriptedInput::new(Buttons::START).hold_at([5, 6]);
    let transitions: Vec<Transition> = (0..8).map(|_| sequencer.tick(&mut input)).collect();
    assert_eq!(transitions[5], Transition::Entered(State::Title));
    assert_eq!(transitions[6], Transition::Entered(State::Idle));
    assert_eq!(sequencer.state(), State::Idle);
}

#[test]
fn other_buttons_do_not_skip() {
    let mut sequencer = Sequencer::new(small(), Recorder::default());
    struct Mash;
    impl rage_intro::types::InputSource for Mash {
        fn poll_buttons(&mut self, _: rage_intro::types::Controller) -> Buttons {
            Buttons::A | Buttons::B | Buttons::C | Buttons::UP
        }
    }
    for _ in 0..5 {
        assert_eq!(sequencer.tick(&mut Mash), Transition::Stay);
    }
    assert_eq!(sequencer.state(), State::Intro { segment: 0 });
}

#[test]
fn title_holds_without_input_and_idle_is_quiet() {
    let entries = trace(small(), 2000, &[1500]);
    assert!(entries.iter().all(|e| e.frame <= 1500));

    let (mut sequencer, _) = started(small());
    let mut input = ScriptedInput::new(Buttons::START);
    for _ in 0..1000 {
        sequencer.tick(&mut input);
    }
    assert_eq!(sequencer.state(), State::Title);
}

#[test]
fn music_starts_once_before_anything_else() {
    let entries = trace(small(), 100, &[50, 60]);
    let starts = frames_where(&entries, |c| matches!(c, SinkCall::StartTrack { .. }));
    assert_eq!(starts, vec![0]);
    assert!(matches!(entries[0].call, SinkCall::StartTrack { .. }));
    assert!(matches!(entries[1].call, SinkCall::LoadTextPalette { palette: 1 }));

    let (mut sequencer, mut audio) = started(small());
    sequencer.start(&mut audio);
    assert_eq!(audio.entries().len(), 1);
}

#[test]
fn every_scene_resets_tile_memory() {
    let entries = trace(small(), 40, &[]);
    let binds: Vec<(Surface, String, u16)> = entries
        .iter()
        .filter_map(|e| match &e.call {
            SinkCall::BindImage {
                surface,
                image,
                first_tile,
                ..
            } => Some((*surface, image.clone(), *first_tile)),
            _ => None,
        })
        .collect();
    assert_eq!(
        binds,
        vec![
            (Surface::Background, "a".into(), 16),
            (Surface::Background, "b".into(), 16),
            (Surface::Background, "c".into(), 16),
            (Surface::Background, "title".into(), 16),
            (Surface::Foreground, "logo".into(), 916),
        ]
    );

    // Every bind is preceded by a clear of all three surfaces in the same frame.
    for bind in frames_where(&entries, |c| {
        matches!(c, SinkCall::BindImage { surface: Surface::Background, .. })
    }) {
        let clears = entries
            .iter()
            .filter(|e| e.frame == bind && matches!(e.call, SinkCall::ClearSurface { .. }))
            .count();
        assert_eq!(clears, 3);
    }
}

#[test]
fn lays_out_centered_lines_at_cursor_rows() {
    let entries = trace(small(), 1, &[]);
    let drawn: Vec<(String, u16, u16)> = entries
        .iter()
        .filter_map(|e| match &e.call {
            SinkCall::DrawText {
                text, column, row, ..
            } => Some((text.clone(), *column, *row)),
            _ => None,
        })
        .collect();
    assert_eq!(
        drawn,
        vec![("AB CD".into(), 3 + 2, 4), ("EFGHIJKLMN".into(), 3, 8)]
    );
}

#[test]
fn scroll_is_monotonic_per_scene_and_reset_at_boundaries() {
    let entries = trace(small(), 30, &[]);
    let scrolls: Vec<(u64, i32)> = entries
        .iter()
        .filter_map(|e| match e.call {
            SinkCall::Scroll {
                surface: Surface::Text,
                axis: Axis::Vertical,
                pixels,
            } => Some((e.frame, pixels)),
            _ => None,
        })
        .collect();

    // Entry resets to zero at frames 0, 9, 19; the final scene change at 29
    // enters the title, which also resets.
    let resets: Vec<u64> = scrolls.iter().filter(|(_, p)| *p == 0).map(|(f, _)| *f).collect();
    assert_eq!(resets, vec![0, 9, 19, 29]);

    for pair in scrolls.windows(2) {
        let ((f1, p1), (f2, p2)) = (pair[0], pair[1]);
        if p2 != 0 {
            assert!(p2 > p1, "offset went from {p1} at {f1} to {p2} at {f2}");
        }
    }
    assert!(scrolls.contains(&(9, 9)));
}

#[test]
fn prompt_blinks_over_its_own_footprint() {
    // Title is entered at the end of frame 29; title frame t is global frame 30 + t.
    let entries = trace(small(), 30 + 17, &[]);
    let prompt: Vec<(u64, SinkCall)> = entries
        .iter()
        .filter(|e| e.frame >= 30)
        .filter(|e| matches!(e.call, SinkCall::DrawText { .. } | SinkCall::ClearText { .. }))
        .map(|e| (e.frame, e.call.clone()))
        .collect();

    let draw = SinkCall::DrawText {
        surface: Surface::Text,
        text: "PRESS  START".into(),
        column: 14,
        row: 25,
    };
    let clear = SinkCall::ClearText {
        surface: Surface::Text,
        column: 14,
        row: 25,
        width: 12,
        rows: 1,
    };
    assert_eq!(
        prompt,
        vec![
            (30, draw.clone()),
            (34, clear.clone()),
            (38, draw.clone()),
            (42, clear),
            (46, draw),
        ]
    );
}

#[test]
fn run_yields_once_per_frame() {
    let mut audio = Recorder::default();
    let mut input = ScriptedInput::new(Buttons::START);
    let mut clock = CountingClock::default();
    let mut sequencer = Sequencer::new(small(), Recorder::default());

    let frames = sequencer.run(&mut audio, &mut input, &mut clock, Some(25));
    assert_eq!(frames, 25);
    assert_eq!(clock.frames, 25);
    assert_eq!(input.polls(), 25);
    assert_eq!(sequencer.state(), State::Intro { segment: 2 });
}

#[test]
fn builtin_show_plays_through_to_title() {
    let show = SourceShow::builtin().unwrap().validate().unwrap();
    let (mut sequencer, audio) = started(show);
    assert_eq!(audio.entries().len(), 1);

    let mut input = ScriptedInput::new(Buttons::START);
    for _ in 0..5400 {
        sequencer.tick(&mut input);
    }
    assert_eq!(sequencer.state(), State::Title);
    assert_eq!(sequencer.stage().tiles().next(), 16 + 1036 + 288);
}

#[test]
fn title_with_a_near_endless_blink_keeps_running() {
    let mut source = SourceShow::from_json(SMALL).unwrap();
    source.title.prompt.on_frames = u32::MAX;
    source.title.prompt.off_frames = 1;
    let entries = trace(source.validate().unwrap(), 40, &[]);

    let prompt = frames_where(&entries, |c| {
        matches!(c, SinkCall::DrawText { row: 25, .. } | SinkCall::ClearText { .. })
    });
    assert_eq!(prompt, vec![30]);
}
