use std::{fs, process};

use anyhow::{Context, Result, bail};

use rage_intro::{
    engine::{
        layout::wrap,
        source::{Show, SourceShow},
    },
    headless,
    player::Player,
};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "rage-intro play [show.json]";
const TRACE_USAGE: &str = "rage-intro trace <show.json|-> <frames> <output.json> [skip-frame...]";
const LAYOUT_USAGE: &str = "rage-intro layout [show.json]";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let show = load(args.next().as_deref())?;
            Player::new(show).play()
        }
        Some("trace") => {
            let show_path = args.next().context(TRACE_USAGE)?;
            let frames = args.next().context(TRACE_USAGE)?;
            let frames: u64 = frames
                .parse()
                .with_context(|| format!("Invalid frame count {frames}"))?;
            let output_path = args.next().context(TRACE_USAGE)?;
            let skips = args
                .map(|a| a.parse::<u64>().with_context(|| format!("Invalid skip frame {a}")))
                .collect::<Result<Vec<_>>>()?;
            trace(&show_path, frames, &output_path, &skips)
        }
        Some("layout") => {
            let show = load(args.next().as_deref())?;
            layout(&show);
            Ok(())
        }
        _ => bail!(
            "Reims en Rage title sequence\n\nUsage:\n  {PLAY_USAGE}\n  {TRACE_USAGE}\n  {LAYOUT_USAGE}\n\nWithout a show file (or with `-`) the built-in show is used."
        ),
    }
}

fn load(path: Option<&str>) -> Result<Show> {
    let source = match path {
        None | Some("-") => SourceShow::builtin().context("Built-in show is invalid")?,
        Some(path) => {
            let json =
                fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
            SourceShow::from_json(&json).with_context(|| format!("Failed to parse {path}"))?
        }
    };
    Ok(source.validate()?)
}

fn trace(show_path: &str, frames: u64, output_path: &str, skips: &[u64]) -> Result<()> {
    let show = load(Some(show_path))?;
    let entries = headless::trace(show, frames, skips);

    let output_json = serde_json::to_string_pretty(&entries)?;
    fs::write(output_path, &output_json)
        .with_context(|| format!("Failed to write {output_path}"))?;

    eprintln!(
        "Traced {} calls over {} frames -> {}",
        entries.len(),
        frames,
        output_path,
    );
    Ok(())
}

/// Print each segment's wrapped, centered text as it will be laid out.
fn layout(show: &Show) {
    let width = show.text.width;
    for segment in &show.segments {
        println!(
            "== {} ({} over {} frames)",
            segment.name, segment.background.name, segment.budget
        );
        for line in wrap(width, segment.lines.iter().map(String::as_str)) {
            let pad = line.left_pad(width);
            let right = line.right_pad(width);
            println!("|{}{}{}|", " ".repeat(pad), line.text, " ".repeat(right));
        }
    }
}
