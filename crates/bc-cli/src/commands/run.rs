//! Run command: the clock's device loop.
//!
//! Collaborators and event sources are chosen once from the [`Mode`]:
//!
//! | Mode        | Presenter          | Sources                       |
//! |-------------|--------------------|-------------------------------|
//! | interactive | `ConsolePresenter` | `ConsoleSource`               |
//! | deployed    | `FramePresenter`   | `ClockPoller`, `ButtonSource` |
//!
//! All sources feed one channel; this thread owns the tracker and drains it.
//! The loop ends on console quit or end of input, or on SIGINT or SIGTERM.

use std::io::{self, BufReader, Write};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use bc_core::{AudioPlayer, Debouncer, Outcome, Presenter, StateTracker, Transition};
use chrono::NaiveDateTime;

use super::util::{describe_state, load_resolver};
use crate::media::{AssetLayout, CommandAudioPlayer, ConsolePresenter, FramePresenter};
use crate::sources::{self, ButtonSource, ClockPoller, ConsoleSource, LoopEvent, SignalSource};
use crate::{Config, Mode};

/// Shown after every handled command in interactive mode.
pub const PROMPT: &str = "Enter command (n/p/s/q): ";

pub fn run(config: &Config, mode: Mode, start: NaiveDateTime) -> Result<()> {
    let resolver = load_resolver(config)?;
    let layout = AssetLayout::new(&config.birds_dir);
    let audio = CommandAudioPlayer::new(layout.clone(), config.audio_argv());

    let (tx, rx) = mpsc::channel();
    let signals = sources::interrupt_signals().context("failed to register signal handlers")?;
    sources::spawn(SignalSource::new(signals), tx.clone());

    let mut stdout = io::stdout();
    write_banner(&mut stdout, mode)?;

    let presenter: Box<dyn Presenter> = match mode {
        Mode::Interactive => {
            sources::spawn(ConsoleSource::new(BufReader::new(io::stdin())), tx);
            Box::new(ConsolePresenter::new(layout, io::stdout()))
        }
        Mode::Deployed => {
            sources::spawn(ClockPoller::new(config.poll_interval()), tx.clone());
            sources::spawn(
                ButtonSource::new(
                    BufReader::new(io::stdin()),
                    Debouncer::new(config.debounce()),
                ),
                tx,
            );
            Box::new(FramePresenter::new(layout, config.frame_path.clone()))
        }
    };
    tracing::info!(?mode, %start, "clock started");

    let prompt = (mode == Mode::Interactive).then_some(PROMPT);
    let (mut tracker, initial) = StateTracker::start(resolver, presenter, audio, start);
    event_loop(&mut stdout, &mut tracker, &initial, &rx, prompt)
}

fn write_banner<W: Write>(writer: &mut W, mode: Mode) -> io::Result<()> {
    writeln!(writer, "Bird Sound and Display Clock")?;
    match mode {
        Mode::Interactive => {
            writeln!(writer, "Press 'n' to manually change to the next hour")?;
            writeln!(writer, "Press 'p' to manually change to the previous hour")?;
            writeln!(writer, "Press 's' to play the current bird's sound")?;
            writeln!(writer, "Press 'q' to quit")?;
        }
        Mode::Deployed => {
            writeln!(writer, "Press the 'Next' button to manually change to the next hour")?;
            writeln!(writer, "Press the 'Prev' button to manually change to the previous hour")?;
            writeln!(writer, "Press the 'Sound' button to play the current bird's sound")?;
        }
    }
    Ok(())
}

/// Drains `events` into `tracker` until a quit or interrupt arrives or every
/// sender is gone, reporting each transition and announcement.
///
/// `prompt` is written after the initial state and after every handled event.
pub fn event_loop<W, P, A>(
    writer: &mut W,
    tracker: &mut StateTracker<P, A>,
    initial: &Transition,
    events: &Receiver<LoopEvent>,
    prompt: Option<&str>,
) -> Result<()>
where
    W: Write,
    P: Presenter,
    A: AudioPlayer,
{
    write_transition(writer, tracker, initial)?;
    write_prompt(writer, prompt)?;

    for event in events {
        let event = match event {
            LoopEvent::Clock(event) => event,
            LoopEvent::Quit => break,
            LoopEvent::Interrupted(_) => {
                writeln!(writer)?;
                writeln!(writer, "Program interrupted by user")?;
                break;
            }
        };
        match tracker.handle(event) {
            Outcome::Transition(transition) => write_transition(writer, tracker, &transition)?,
            Outcome::Announced { bird, clip } => {
                let name = tracker
                    .resolver()
                    .catalog()
                    .bird(&bird)
                    .map_or_else(|| bird.to_string(), |b| b.name.clone());
                let file = clip.file_name().unwrap_or(clip.as_os_str());
                writeln!(writer, "Playing {} for {name}", file.to_string_lossy())?;
            }
            Outcome::AnnounceFailed(e) => writeln!(writer, "Could not play sound: {e}")?,
            Outcome::Unchanged | Outcome::NothingToAnnounce => {}
        }
        write_prompt(writer, prompt)?;
    }
    writer.flush()?;

    tracing::info!(at = %tracker.timestamp(), "clock stopped");
    Ok(())
}

fn write_prompt<W: Write>(writer: &mut W, prompt: Option<&str>) -> io::Result<()> {
    if let Some(prompt) = prompt {
        write!(writer, "{prompt}")?;
    }
    writer.flush()
}

fn write_transition<W, P, A>(
    writer: &mut W,
    tracker: &StateTracker<P, A>,
    transition: &Transition,
) -> io::Result<()>
where
    W: Write,
    P: Presenter,
    A: AudioPlayer,
{
    let catalog = tracker.resolver().catalog();
    writeln!(
        writer,
        "Current time: {} - {}\nCurrent bird: {}",
        transition.at.format("%H:%M"),
        transition.to.season(),
        describe_state(catalog, &transition.to)
    )
}
