//! Season, quiet-hour and bird schedule catalog.
//!
//! The catalog is built once from the catalog file and never mutated. All
//! invariants the resolver relies on are checked in [`ScheduleCatalog::from_data`]:
//!
//! - every month 1–12 belongs to exactly one season
//! - every season has a quiet-hours window
//! - every bird has a non-empty name and slug
//!
//! Per-season schedules are merged from the bird definitions at construction.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BirdId, Month, SeasonId, TimeOfDay, ValidationError};

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No season covers the month.
    #[error("month {month} is not covered by any season")]
    UnmappedMonth { month: u32 },

    /// Two seasons claim the same month.
    #[error("month {month} is covered by both {first} and {second}")]
    MonthCoveredTwice {
        month: Month,
        first: SeasonId,
        second: SeasonId,
    },

    /// A season lists a month outside 1–12.
    #[error("season {season} lists invalid month {month}")]
    InvalidMonth { season: SeasonId, month: u32 },

    /// A season has no quiet-hours window.
    #[error("season {season} has no quiet hours")]
    MissingQuietWindow { season: SeasonId },

    /// A bird definition failed validation.
    #[error("bird {bird}: {source}")]
    InvalidBird {
        bird: BirdId,
        #[source]
        source: ValidationError,
    },

    /// The catalog file is not valid JSON or does not match the schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw catalog contents, exactly as stored in the catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    pub seasons: BTreeMap<SeasonId, SeasonData>,
    #[serde(default)]
    pub quiet_hours: BTreeMap<SeasonId, QuietWindow>,
    #[serde(default)]
    pub birds: BTreeMap<BirdId, BirdData>,
}

/// Raw season definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonData {
    /// Calendar month numbers covered by this season.
    pub months: Vec<u32>,
}

/// Raw bird definition, keyed by [`BirdId`] in [`CatalogData::birds`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BirdData {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub seasons: BTreeMap<SeasonId, Vec<TimeOfDay>>,
}

/// A daily window during which no bird is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl QuietWindow {
    /// Returns `true` if the window runs past midnight into the next day.
    #[must_use]
    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }
}

/// A validated bird definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirdDefinition {
    pub id: BirdId,
    /// Human-readable name shown on the console.
    pub name: String,
    /// Directory name under the birds folder holding the image and clips.
    pub slug: String,
    /// Activation times per season, in the order they were listed.
    pub seasons: BTreeMap<SeasonId, Vec<TimeOfDay>>,
}

impl BirdDefinition {
    fn from_data(id: BirdId, data: BirdData) -> Result<Self, ConfigError> {
        let invalid = |field| ConfigError::InvalidBird {
            bird: id.clone(),
            source: ValidationError::Empty { field },
        };
        if data.name.is_empty() {
            return Err(invalid("bird name"));
        }
        if data.slug.is_empty() {
            return Err(invalid("bird slug"));
        }
        Ok(Self {
            id,
            name: data.name,
            slug: data.slug,
            seasons: data.seasons,
        })
    }
}

/// Everything the resolver needs about one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEntry {
    pub id: SeasonId,
    /// Months covered, ascending.
    pub months: Vec<Month>,
    pub quiet: QuietWindow,
    /// Merged schedule: activation time → bird.
    pub schedule: BTreeMap<TimeOfDay, BirdId>,
}

static EMPTY_SCHEDULE: BTreeMap<TimeOfDay, BirdId> = BTreeMap::new();

/// Immutable, validated catalog of seasons, quiet hours and bird schedules.
#[derive(Debug, Clone)]
pub struct ScheduleCatalog {
    /// Seasons sorted by ID.
    seasons: Vec<SeasonEntry>,
    /// Index into `seasons` for each month, by `Month::index`.
    by_month: [usize; 12],
    birds: BTreeMap<BirdId, BirdDefinition>,
}

impl ScheduleCatalog {
    /// Reads and validates a catalog file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Validates raw catalog data and merges the per-season schedules.
    pub fn from_data(data: CatalogData) -> Result<Self, ConfigError> {
        let CatalogData {
            seasons,
            mut quiet_hours,
            birds,
        } = data;

        let mut owners: [Option<usize>; 12] = [None; 12];
        let mut entries = Vec::with_capacity(seasons.len());

        for (idx, (id, season)) in seasons.into_iter().enumerate() {
            let mut months = Vec::with_capacity(season.months.len());
            for raw in season.months {
                let month = Month::new(raw).map_err(|_| ConfigError::InvalidMonth {
                    season: id.clone(),
                    month: raw,
                })?;
                match owners[month.index()] {
                    Some(other) if other != idx => {
                        let first: &SeasonEntry = &entries[other];
                        return Err(ConfigError::MonthCoveredTwice {
                            month,
                            first: first.id.clone(),
                            second: id,
                        });
                    }
                    Some(_) => continue,
                    None => owners[month.index()] = Some(idx),
                }
                months.push(month);
            }
            months.sort_unstable();

            let quiet = quiet_hours
                .remove(&id)
                .ok_or_else(|| ConfigError::MissingQuietWindow { season: id.clone() })?;

            entries.push(SeasonEntry {
                id,
                months,
                quiet,
                schedule: BTreeMap::new(),
            });
        }

        for month in Month::ALL {
            if owners[month.index()].is_none() {
                return Err(ConfigError::UnmappedMonth {
                    month: month.number(),
                });
            }
        }
        let by_month = owners.map(|owner| owner.unwrap_or_default());

        for season in quiet_hours.keys() {
            tracing::warn!(%season, "quiet hours defined for unknown season, ignoring");
        }

        let birds = birds
            .into_iter()
            .map(|(id, data)| BirdDefinition::from_data(id.clone(), data).map(|b| (id, b)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        merge_schedules(&mut entries, &birds);

        Ok(Self {
            seasons: entries,
            by_month,
            birds,
        })
    }

    /// Returns the season covering `month`.
    pub fn season_for(&self, month: u32) -> Result<&SeasonId, ConfigError> {
        let month = Month::new(month).map_err(|_| ConfigError::UnmappedMonth { month })?;
        Ok(&self.season(month).id)
    }

    /// Returns the quiet-hours window of `season`.
    pub fn quiet_window_for(&self, season: &SeasonId) -> Result<QuietWindow, ConfigError> {
        self.find_season(season)
            .map(|entry| entry.quiet)
            .ok_or_else(|| ConfigError::MissingQuietWindow {
                season: season.clone(),
            })
    }

    /// Returns the merged schedule of `season`.
    ///
    /// Unknown seasons and seasons no bird visits both yield an empty schedule.
    pub fn schedule_for(&self, season: &SeasonId) -> &BTreeMap<TimeOfDay, BirdId> {
        self.find_season(season)
            .map_or(&EMPTY_SCHEDULE, |entry| &entry.schedule)
    }

    /// Returns the season entry covering `month`.
    #[must_use]
    pub fn season(&self, month: Month) -> &SeasonEntry {
        &self.seasons[self.by_month[month.index()]]
    }

    /// Returns all seasons, sorted by ID.
    #[must_use]
    pub fn seasons(&self) -> &[SeasonEntry] {
        &self.seasons
    }

    /// Looks up a season by ID.
    #[must_use]
    pub fn find_season(&self, season: &SeasonId) -> Option<&SeasonEntry> {
        self.seasons
            .binary_search_by(|entry| entry.id.cmp(season))
            .ok()
            .map(|idx| &self.seasons[idx])
    }

    /// Looks up a bird by ID.
    #[must_use]
    pub fn bird(&self, id: &BirdId) -> Option<&BirdDefinition> {
        self.birds.get(id)
    }

    /// Returns all birds, sorted by ID.
    pub fn birds(&self) -> impl Iterator<Item = &BirdDefinition> {
        self.birds.values()
    }
}

/// Merges every bird's entries into the per-season schedules.
///
/// Birds are processed in ID order and each bird's times in listed order. A
/// time that is already taken is overwritten by the later entry.
fn merge_schedules(entries: &mut [SeasonEntry], birds: &BTreeMap<BirdId, BirdDefinition>) {
    let positions: HashMap<SeasonId, usize> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| (entry.id.clone(), idx))
        .collect();

    for bird in birds.values() {
        for (season, times) in &bird.seasons {
            let Some(&idx) = positions.get(season) else {
                tracing::warn!(bird = %bird.id, %season, "bird scheduled in unknown season, ignoring");
                continue;
            };
            let schedule = &mut entries[idx].schedule;
            for time in times {
                if let Some(previous) = schedule.insert(*time, bird.id.clone()) {
                    tracing::warn!(
                        %season,
                        %time,
                        %previous,
                        bird = %bird.id,
                        "schedule slot already taken, later entry wins"
                    );
                }
            }
        }
    }
}
