//! Timestamp → season, quiet-hours and active-bird resolution.
//!
//! # Algorithm
//!
//! 1. Derive month and minute-resolution time of day from the timestamp
//! 2. Look up the season owning the month
//! 3. If the time falls in the season's quiet window, the clock is quiet
//! 4. Otherwise the active bird is the one with the latest schedule slot at
//!    or before the current time; before the first slot of the day no bird
//!    is scheduled (there is no carry-over from the previous evening)

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::{QuietWindow, ScheduleCatalog};
use crate::types::{BirdId, Month, SeasonId, TimeOfDay};

/// How a quiet window is matched against the time of day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuietRule {
    /// Windows with `start <= end` cover `[start, end)` within one day;
    /// windows with `start > end` run across midnight.
    #[default]
    WindowAware,
    /// Always treat the window as crossing midnight: quiet iff
    /// `t >= start || t < end`. Matches the behaviour of the first-generation
    /// device, which mis-handles daytime windows.
    AlwaysWrap,
}

impl QuietRule {
    /// Returns `true` if `time` falls inside `window` under this rule.
    #[must_use]
    pub fn is_quiet(self, window: QuietWindow, time: TimeOfDay) -> bool {
        let QuietWindow { start, end } = window;
        match self {
            Self::WindowAware if start <= end => start <= time && time < end,
            Self::WindowAware | Self::AlwaysWrap => time >= start || time < end,
        }
    }
}

/// Outcome of resolving a timestamp against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ResolvedState {
    /// The season's quiet window is in effect.
    #[serde(rename = "quiet-hours")]
    Quiet { season: SeasonId },
    /// Outside quiet hours, but no schedule slot has started yet today.
    NoBirdsScheduled { season: SeasonId },
    /// `bird` owns the most recently started slot.
    Active { bird: BirdId, season: SeasonId },
}

impl ResolvedState {
    /// Returns the season this state was resolved in.
    #[must_use]
    pub const fn season(&self) -> &SeasonId {
        match self {
            Self::Quiet { season }
            | Self::NoBirdsScheduled { season }
            | Self::Active { season, .. } => season,
        }
    }

    /// Returns the active bird, if any.
    #[must_use]
    pub const fn bird(&self) -> Option<&BirdId> {
        match self {
            Self::Active { bird, .. } => Some(bird),
            Self::Quiet { .. } | Self::NoBirdsScheduled { .. } => None,
        }
    }

    /// Short label used when no bird is active. Matches the JSON `state` tag.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Quiet { .. } => "quiet-hours",
            Self::NoBirdsScheduled { .. } => "no-birds-scheduled",
            Self::Active { .. } => "active",
        }
    }
}

impl fmt::Display for ResolvedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active { bird, season } => write!(f, "{bird} ({season})"),
            Self::Quiet { season } | Self::NoBirdsScheduled { season } => {
                write!(f, "{} ({season})", self.label())
            }
        }
    }
}

/// Stateless resolver over a shared, validated catalog.
///
/// Cloning is cheap and clones may be used from any thread.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<ScheduleCatalog>,
    rule: QuietRule,
}

impl Resolver {
    /// Creates a resolver using `rule` for quiet-window matching.
    #[must_use]
    pub const fn new(catalog: Arc<ScheduleCatalog>, rule: QuietRule) -> Self {
        Self { catalog, rule }
    }

    /// Returns the catalog this resolver reads from.
    #[must_use]
    pub fn catalog(&self) -> &ScheduleCatalog {
        &self.catalog
    }

    /// Returns the quiet-window rule in use.
    #[must_use]
    pub const fn rule(&self) -> QuietRule {
        self.rule
    }

    /// Resolves `timestamp` to a season, quiet status and active bird.
    #[must_use]
    pub fn resolve(&self, timestamp: NaiveDateTime) -> ResolvedState {
        let time = TimeOfDay::of(&timestamp);
        let month = Month::ALL[timestamp.month0() as usize];
        let entry = self.catalog.season(month);
        let season = entry.id.clone();

        if self.rule.is_quiet(entry.quiet, time) {
            return ResolvedState::Quiet { season };
        }

        match entry.schedule.range(..=time).next_back() {
            Some((_, bird)) => ResolvedState::Active {
                bird: bird.clone(),
                season,
            },
            None => ResolvedState::NoBirdsScheduled { season },
        }
    }
}
