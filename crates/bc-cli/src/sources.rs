//! Producers feeding the clock's event channel.
//!
//! Each source runs on its own thread and sends [`LoopEvent`]s until its
//! input ends or the receiver goes away. The run loop is the only consumer.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bc_core::{ClockEvent, Debouncer};
use chrono::NaiveDateTime;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::commands::util;

/// Everything the run loop consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Input for the state tracker.
    Clock(ClockEvent),
    /// The console asked to quit or reached end of input.
    Quit,
    /// SIGINT or SIGTERM arrived; the loop stops.
    Interrupted(i32),
}

impl From<ClockEvent> for LoopEvent {
    fn from(event: ClockEvent) -> Self {
        Self::Clock(event)
    }
}

/// A producer of loop events.
pub trait EventSource {
    /// Sends events until the input is exhausted or the receiver hangs up.
    fn run(self, events: Sender<LoopEvent>);
}

/// Runs `source` on a new thread.
pub fn spawn<S>(source: S, events: Sender<LoopEvent>) -> JoinHandle<()>
where
    S: EventSource + Send + 'static,
{
    thread::spawn(move || source.run(events))
}

/// A console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Sound,
    Quit,
}

impl Command {
    /// The clock event this command produces, `None` for [`Command::Quit`].
    pub fn event(self) -> Option<ClockEvent> {
        match self {
            Self::Next => Some(ClockEvent::next_hour()),
            Self::Prev => Some(ClockEvent::previous_hour()),
            Self::Sound => Some(ClockEvent::Announce),
            Self::Quit => None,
        }
    }
}

/// Parses a console line; case and surrounding whitespace are ignored.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "next" => Some(Command::Next),
        "p" | "prev" => Some(Command::Prev),
        "s" | "sound" => Some(Command::Sound),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

/// Reads console commands line by line (interactive mode).
///
/// Sends [`LoopEvent::Quit`] once input stops.
#[derive(Debug)]
pub struct ConsoleSource<R> {
    input: R,
}

impl<R: BufRead> ConsoleSource<R> {
    pub const fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> EventSource for ConsoleSource<R> {
    fn run(self, events: Sender<LoopEvent>) {
        for line in self.input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read console input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let Some(command) = parse_command(&line) else {
                eprintln!("Unknown command: {} (use n/p/s/q)", line.trim());
                continue;
            };
            let Some(event) = command.event() else {
                tracing::debug!("quit requested");
                break;
            };
            if events.send(event.into()).is_err() {
                return;
            }
        }
        let _ = events.send(LoopEvent::Quit);
    }
}

/// A physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Next,
    Prev,
    Sound,
}

impl Button {
    pub fn event(self) -> ClockEvent {
        match self {
            Self::Next => ClockEvent::next_hour(),
            Self::Prev => ClockEvent::previous_hour(),
            Self::Sound => ClockEvent::Announce,
        }
    }
}

impl FromStr for Button {
    type Err = String;

    /// Accepts button names or the BCM pin numbers they are wired to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" | "17" => Ok(Self::Next),
            "prev" | "27" => Ok(Self::Prev),
            "sound" | "22" => Ok(Self::Sound),
            other => Err(format!("unknown button: {other}")),
        }
    }
}

/// Reads button edges from a GPIO helper, one button per line (deployed mode).
///
/// Edges closer together than the debounce spacing are dropped per button.
#[derive(Debug)]
pub struct ButtonSource<R> {
    input: R,
    debouncer: Debouncer<Button>,
}

impl<R: BufRead> ButtonSource<R> {
    pub const fn new(input: R, debouncer: Debouncer<Button>) -> Self {
        Self { input, debouncer }
    }
}

impl<R: BufRead> EventSource for ButtonSource<R> {
    fn run(mut self, events: Sender<LoopEvent>) {
        for line in self.input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read button input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let button = match line.parse::<Button>() {
                Ok(button) => button,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring button input");
                    continue;
                }
            };
            if !self.debouncer.admit(button, Instant::now()) {
                tracing::debug!(?button, "button press debounced");
                continue;
            }
            if events.send(button.event().into()).is_err() {
                break;
            }
        }
    }
}

/// Sends the wall-clock time at a fixed interval (deployed mode).
///
/// The first reading is sent one interval after start.
#[derive(Debug, Clone, Copy)]
pub struct ClockPoller {
    interval: Duration,
    now: fn() -> NaiveDateTime,
}

impl ClockPoller {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, util::now)
    }

    /// Creates a poller reading time from `now`.
    pub const fn with_clock(interval: Duration, now: fn() -> NaiveDateTime) -> Self {
        Self { interval, now }
    }
}

impl EventSource for ClockPoller {
    fn run(self, events: Sender<LoopEvent>) {
        loop {
            thread::sleep(self.interval);
            let event = ClockEvent::SetClock((self.now)());
            if events.send(event.into()).is_err() {
                break;
            }
        }
    }
}

/// Registers for SIGINT and SIGTERM, yielding each signal as it arrives.
///
/// Once registered, those signals no longer terminate the process.
pub fn interrupt_signals() -> io::Result<impl Iterator<Item = i32> + Send + 'static> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    Ok(std::iter::from_fn(move || signals.forever().next()))
}

/// Forwards the first interrupt signal to the run loop.
#[derive(Debug)]
pub struct SignalSource<I> {
    signals: I,
}

impl<I: IntoIterator<Item = i32>> SignalSource<I> {
    pub const fn new(signals: I) -> Self {
        Self { signals }
    }
}

impl<I: IntoIterator<Item = i32>> EventSource for SignalSource<I> {
    fn run(self, events: Sender<LoopEvent>) {
        if let Some(signal) = self.signals.into_iter().next() {
            tracing::info!(signal, "interrupt received");
            let _ = events.send(LoopEvent::Interrupted(signal));
        }
    }
}
