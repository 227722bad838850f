//! Replays a recorded landmark stream through a coaching session.
//!
//! Usage: `rehab-replay <exercise-key> <frames.jsonl> [config.toml]`
//!
//! Each input line is one JSON-encoded frame. Frames are spaced at 30 fps;
//! spoken feedback is written to the log and the session summary is printed
//! to stdout as JSON.

use std::fs::File;
use std::io::BufReader;

use anyhow::{bail, Context, Result};
use rehab_coach::{CoachConfig, CoachSession, InMemoryHistory, Locale, SpeechSink};
use rehab_core::{read_frames, Timestamp};
use rehab_motion::ExerciseKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_INTERVAL_MS: i64 = 33;

/// Speech sink that writes utterances to the log
struct LogSink;

impl SpeechSink for LogSink {
    fn speak(&mut self, text: &str, locale: Locale) -> rehab_core::Result<()> {
        info!(%locale, "Speak: {}", text);
        Ok(())
    }

    fn cancel(&mut self) {}
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: rehab-replay <exercise-key> <frames.jsonl> [config.toml]");
    }

    let exercise: ExerciseKind = args[0].parse()?;
    let config = match args.get(2) {
        Some(path) => CoachConfig::from_file(path).with_context(|| format!("loading {}", path))?,
        None => CoachConfig::default(),
    };

    let file = File::open(&args[1]).with_context(|| format!("opening {}", args[1]))?;

    let mut coach = CoachSession::new(LogSink, InMemoryHistory::new(), &config);
    coach.select_exercise(exercise);

    let started = Timestamp::now();
    coach.start_at(started)?;

    let mut now = started;
    let mut frames = 0usize;
    for frame in read_frames(BufReader::new(file)) {
        let frame = frame.with_context(|| format!("reading {}", args[1]))?;

        now = Timestamp::from_millis(started.as_millis() + frames as i64 * FRAME_INTERVAL_MS);
        if let Some(report) = coach.process_frame_at(&frame, now) {
            info!(
                reps = report.state.reps,
                stage = ?report.state.stage,
                accuracy = report.state.accuracy,
                feedback = %report.state.feedback,
                "Frame {}",
                frames
            );
        }
        // Utterances finish instantly in a replay
        coach.voice_mut().on_end();
        frames += 1;
    }

    let summary = coach
        .stop_at(now)
        .context("session was not active")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
