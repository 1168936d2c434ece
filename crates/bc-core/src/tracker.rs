//! Transition detection over a serialized stream of clock events.
//!
//! The tracker owns the clock's timestamp and the last resolved state. Every
//! input (real-clock poll, manual hour step, announce button) arrives as a
//! [`ClockEvent`] through [`StateTracker::handle`], so a single `&mut` borrow
//! covers the whole resolve-compare-replace step.

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};

use crate::media::{AudioPlayer, MediaError, Presenter};
use crate::resolver::{ResolvedState, Resolver};
use crate::types::BirdId;

/// A discrete input to the state tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Shift the tracked timestamp by a signed duration.
    Advance(Duration),
    /// Replace the tracked timestamp.
    SetClock(NaiveDateTime),
    /// Play a clip for the active bird.
    Announce,
}

impl ClockEvent {
    /// Manual step one hour forward.
    #[must_use]
    pub fn next_hour() -> Self {
        Self::Advance(Duration::hours(1))
    }

    /// Manual step one hour back.
    #[must_use]
    pub fn previous_hour() -> Self {
        Self::Advance(Duration::hours(-1))
    }
}

/// A change in resolved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Previous state, `None` for the initial resolution.
    pub from: Option<ResolvedState>,
    pub to: ResolvedState,
    /// Timestamp the new state was resolved at.
    pub at: NaiveDateTime,
}

/// What handling one event produced.
#[derive(Debug)]
pub enum Outcome {
    /// The resolved state did not change.
    Unchanged,
    /// The resolved state changed.
    Transition(Transition),
    /// A clip was started for the active bird.
    Announced { bird: BirdId, clip: PathBuf },
    /// Announce requested while no bird is active.
    NothingToAnnounce,
    /// Announce failed. The error has already been logged.
    AnnounceFailed(MediaError),
}

/// Holds the current resolved state and notifies collaborators on change.
#[derive(Debug)]
pub struct StateTracker<P, A> {
    resolver: Resolver,
    presenter: P,
    audio: A,
    timestamp: NaiveDateTime,
    current: ResolvedState,
}

impl<P: Presenter, A: AudioPlayer> StateTracker<P, A> {
    /// Resolves `timestamp` and starts tracking from that state.
    ///
    /// The initial resolution counts as a transition: if it is active, the
    /// presenter is asked to display the bird.
    pub fn start(
        resolver: Resolver,
        presenter: P,
        audio: A,
        timestamp: NaiveDateTime,
    ) -> (Self, Transition) {
        let current = resolver.resolve(timestamp);
        let mut tracker = Self {
            resolver,
            presenter,
            audio,
            timestamp,
            current: current.clone(),
        };
        tracker.present(&current);
        tracing::info!(to = %current, at = %timestamp, "initial state");

        let transition = Transition {
            from: None,
            to: current,
            at: timestamp,
        };
        (tracker, transition)
    }

    /// Dispatches one event from the serialized event stream.
    pub fn handle(&mut self, event: ClockEvent) -> Outcome {
        let transition = match event {
            ClockEvent::Advance(delta) => self.advance(delta),
            ClockEvent::SetClock(timestamp) => self.set_clock(timestamp),
            ClockEvent::Announce => {
                return match self.announce_current() {
                    Ok(Some(clip)) => match self.current.bird() {
                        Some(bird) => Outcome::Announced {
                            bird: bird.clone(),
                            clip,
                        },
                        None => Outcome::NothingToAnnounce,
                    },
                    Ok(None) => Outcome::NothingToAnnounce,
                    Err(e) => Outcome::AnnounceFailed(e),
                };
            }
        };
        transition.map_or(Outcome::Unchanged, Outcome::Transition)
    }

    /// Shifts the tracked timestamp by `delta` and re-resolves.
    pub fn advance(&mut self, delta: Duration) -> Option<Transition> {
        let Some(timestamp) = self.timestamp.checked_add_signed(delta) else {
            tracing::warn!(at = %self.timestamp, ?delta, "clock step out of range, ignoring");
            return None;
        };
        self.set_clock(timestamp)
    }

    /// Replaces the tracked timestamp and re-resolves.
    pub fn set_clock(&mut self, timestamp: NaiveDateTime) -> Option<Transition> {
        self.timestamp = timestamp;
        let next = self.resolver.resolve(timestamp);
        if next == self.current {
            return None;
        }

        let from = std::mem::replace(&mut self.current, next.clone());
        self.present(&next);
        tracing::info!(%from, to = %next, at = %timestamp, "state transition");

        Some(Transition {
            from: Some(from),
            to: next,
            at: timestamp,
        })
    }

    /// Plays a random clip for the active bird.
    ///
    /// Returns `Ok(None)` without touching the audio player when no bird is
    /// active.
    pub fn announce_current(&mut self) -> Result<Option<PathBuf>, MediaError> {
        let Some(bird_id) = self.current.bird() else {
            tracing::debug!(state = %self.current, "no active bird to announce");
            return Ok(None);
        };
        let Some(bird) = self.resolver.catalog().bird(bird_id) else {
            tracing::warn!(bird = %bird_id, "active bird missing from catalog");
            return Ok(None);
        };

        match self.audio.play_random(bird) {
            Ok(clip) => {
                tracing::info!(bird = %bird.id, clip = %clip.display(), "playing clip");
                Ok(Some(clip))
            }
            Err(e) => {
                tracing::warn!(bird = %bird.id, error = %e, "announce failed");
                Err(e)
            }
        }
    }

    fn present(&mut self, state: &ResolvedState) {
        let Some(bird_id) = state.bird() else {
            return;
        };
        let Some(bird) = self.resolver.catalog().bird(bird_id) else {
            tracing::warn!(bird = %bird_id, "active bird missing from catalog");
            return;
        };
        if let Err(e) = self.presenter.display(bird) {
            tracing::warn!(bird = %bird.id, error = %e, "display failed");
        }
    }

    /// Returns the current resolved state.
    pub const fn current(&self) -> &ResolvedState {
        &self.current
    }

    /// Returns the tracked timestamp.
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Returns the resolver.
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Returns the presenter.
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Returns the audio player.
    pub const fn audio(&self) -> &A {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use crate::catalog::{BirdDefinition, ScheduleCatalog};
    use crate::resolver::QuietRule;

    #[derive(Debug, Default)]
    struct RecordingPresenter {
        shown: Vec<String>,
        fail: bool,
    }

    impl Presenter for RecordingPresenter {
        fn display(&mut self, bird: &BirdDefinition) -> Result<(), MediaError> {
            self.shown.push(bird.id.to_string());
            if self.fail {
                return Err(MediaError::ResourceMissing {
                    bird: bird.id.clone(),
                    path: PathBuf::from("missing.jpg"),
                });
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingAudio {
        played: Vec<String>,
        empty: bool,
    }

    impl AudioPlayer for RecordingAudio {
        fn play_random(&mut self, bird: &BirdDefinition) -> Result<PathBuf, MediaError> {
            if self.empty {
                return Err(MediaError::NoClipsAvailable {
                    bird: bird.id.clone(),
                });
            }
            self.played.push(bird.id.to_string());
            Ok(PathBuf::from(format!("{}/call.mp3", bird.slug)))
        }
    }

    fn resolver() -> Resolver {
        let catalog = ScheduleCatalog::from_json(
            &json!({
                "seasons": { "year": { "months": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12] } },
                "quietHours": { "year": { "start": "22:00", "end": "06:00" } },
                "birds": {
                    "a": { "name": "A", "slug": "a", "seasons": { "year": ["08:00"] } },
                    "b": { "name": "B", "slug": "b", "seasons": { "year": ["12:00"] } }
                }
            })
            .to_string(),
        )
        .unwrap();
        Resolver::new(Arc::new(catalog), QuietRule::WindowAware)
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn start_at(
        timestamp: NaiveDateTime,
    ) -> (StateTracker<RecordingPresenter, RecordingAudio>, Transition) {
        StateTracker::start(
            resolver(),
            RecordingPresenter::default(),
            RecordingAudio::default(),
            timestamp,
        )
    }

    #[test]
    fn presenter_called_once_per_transition() {
        let (mut tracker, initial) = start_at(at(8, 30));
        assert!(initial.from.is_none());

        assert!(tracker.set_clock(at(9, 0)).is_none());
        let transition = tracker.set_clock(at(12, 5)).unwrap();

        assert_eq!(tracker.presenter().shown, vec!["a", "b"]);
        assert_eq!(transition.from.as_ref().and_then(|s| s.bird()).unwrap().as_str(), "a");
        assert_eq!(transition.to.bird().unwrap().as_str(), "b");
        assert_eq!(transition.at, at(12, 5));
    }

    #[test]
    fn initial_quiet_state_does_not_present() {
        let (tracker, initial) = start_at(at(23, 0));
        assert!(matches!(initial.to, ResolvedState::Quiet { .. }));
        assert!(tracker.presenter().shown.is_empty());
    }

    #[test]
    fn transition_into_non_active_state_does_not_present() {
        let (mut tracker, _) = start_at(at(12, 0));
        let transition = tracker.set_clock(at(22, 0)).unwrap();

        assert!(matches!(transition.to, ResolvedState::Quiet { .. }));
        assert_eq!(tracker.presenter().shown, vec!["b"]);
    }

    #[test]
    fn advance_steps_hours_both_ways() {
        let (mut tracker, _) = start_at(at(11, 30));

        let forward = tracker.handle(ClockEvent::next_hour());
        assert!(matches!(forward, Outcome::Transition(_)));
        assert_eq!(tracker.timestamp(), at(12, 30));

        let back = tracker.handle(ClockEvent::previous_hour());
        assert!(matches!(back, Outcome::Transition(_)));
        assert_eq!(tracker.timestamp(), at(11, 30));
        assert_eq!(tracker.current().bird().unwrap().as_str(), "a");
        assert_eq!(tracker.presenter().shown, vec!["a", "b", "a"]);
    }

    #[test]
    fn advance_across_midnight_changes_day() {
        let (mut tracker, _) = start_at(at(23, 30));
        assert!(tracker.advance(Duration::hours(1)).is_none());
        assert_eq!(tracker.timestamp().date(), at(0, 0).date().succ_opt().unwrap());
    }

    #[test]
    fn clock_poll_and_manual_steps_agree() {
        let (mut polled, _) = start_at(at(7, 0));
        let (mut stepped, _) = start_at(at(7, 0));

        for hour in 8..=13 {
            let a = polled.handle(ClockEvent::SetClock(at(hour, 0)));
            let b = stepped.handle(ClockEvent::next_hour());
            assert_eq!(
                matches!(a, Outcome::Transition(_)),
                matches!(b, Outcome::Transition(_)),
                "divergence at {hour}:00"
            );
            assert_eq!(polled.current(), stepped.current());
        }
        assert_eq!(polled.presenter().shown, stepped.presenter().shown);
    }

    #[test]
    fn display_failure_is_not_fatal() {
        let presenter = RecordingPresenter {
            fail: true,
            ..RecordingPresenter::default()
        };
        let (mut tracker, _) =
            StateTracker::start(resolver(), presenter, RecordingAudio::default(), at(8, 0));

        let transition = tracker.set_clock(at(12, 0));
        assert!(transition.is_some());
        assert_eq!(tracker.current().bird().unwrap().as_str(), "b");
    }

    #[test]
    fn announce_plays_active_bird() {
        let (mut tracker, _) = start_at(at(12, 15));
        match tracker.handle(ClockEvent::Announce) {
            Outcome::Announced { bird, clip } => {
                assert_eq!(bird.as_str(), "b");
                assert_eq!(clip, PathBuf::from("b/call.mp3"));
            }
            other => panic!("expected Announced, got {other:?}"),
        }
        assert_eq!(tracker.audio().played, vec!["b"]);
    }

    #[test]
    fn announce_is_noop_without_active_bird() {
        let (mut quiet, _) = start_at(at(3, 0));
        assert!(matches!(
            quiet.handle(ClockEvent::Announce),
            Outcome::NothingToAnnounce
        ));

        let (mut early, _) = start_at(at(7, 0));
        assert!(early.announce_current().unwrap().is_none());

        assert!(quiet.audio().played.is_empty());
        assert!(early.audio().played.is_empty());
    }

    #[test]
    fn announce_reports_missing_clips() {
        let audio = RecordingAudio {
            empty: true,
            ..RecordingAudio::default()
        };
        let (mut tracker, _) =
            StateTracker::start(resolver(), RecordingPresenter::default(), audio, at(9, 0));

        assert!(matches!(
            tracker.handle(ClockEvent::Announce),
            Outcome::AnnounceFailed(MediaError::NoClipsAvailable { .. })
        ));
    }

    #[test]
    fn announce_does_not_change_state() {
        let (mut tracker, _) = start_at(at(9, 0));
        let before = tracker.current().clone();
        let _ = tracker.handle(ClockEvent::Announce);
        assert_eq!(tracker.current(), &before);
        assert_eq!(tracker.presenter().shown, vec!["a"]);
    }

    #[test]
    fn boxed_collaborators_are_accepted() {
        let presenter: Box<dyn Presenter> = Box::new(RecordingPresenter::default());
        let audio: Box<dyn AudioPlayer> = Box::new(RecordingAudio::default());
        let (mut tracker, _) = StateTracker::start(resolver(), presenter, audio, at(8, 0));
        assert!(tracker.set_clock(at(12, 0)).is_some());
    }
}
