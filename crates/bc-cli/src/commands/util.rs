//! Shared utilities for CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use bc_core::{ResolvedState, Resolver, ScheduleCatalog, TimeOfDay};
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::Config;

/// Accepted `--at` layouts, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// The current local wall-clock time.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a datetime string as a full local datetime or a time of day.
///
/// Supports:
/// - "2025-04-10T07:30", "2025-04-10T07:30:15"
/// - "2025-04-10 07:30", "2025-04-10 07:30:15"
/// - "07:30" (on `today`)
pub fn parse_datetime(s: &str, today: NaiveDate) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    let Ok(time) = s.parse::<TimeOfDay>() else {
        anyhow::bail!("Invalid datetime: {s}. Use YYYY-MM-DDTHH:MM[:SS] or HH:MM");
    };
    today
        .and_hms_opt(u32::from(time.hour()), u32::from(time.minute()), 0)
        .with_context(|| format!("invalid time of day: {s}"))
}

/// Resolves an optional `--at` argument, defaulting to now.
pub fn resolve_at(at: Option<&str>) -> Result<NaiveDateTime> {
    let now = now();
    at.map_or(Ok(now), |s| parse_datetime(s, now.date()))
}

/// Loads and validates the configured catalog.
pub fn load_catalog(config: &Config) -> Result<ScheduleCatalog> {
    let catalog = ScheduleCatalog::from_path(&config.catalog_path)
        .with_context(|| format!("invalid catalog {}", config.catalog_path.display()))?;
    tracing::debug!(
        path = %config.catalog_path.display(),
        seasons = catalog.seasons().len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Loads the catalog and wraps it in a resolver using the configured rule.
pub fn load_resolver(config: &Config) -> Result<Resolver> {
    let catalog = load_catalog(config)?;
    Ok(Resolver::new(Arc::new(catalog), config.quiet_rule))
}

/// The bird's display name, or the state label when no bird is active.
pub fn describe_state(catalog: &ScheduleCatalog, state: &ResolvedState) -> String {
    state
        .bird()
        .map_or_else(
            || state.label().to_string(),
            |id| catalog.bird(id).map_or_else(|| id.to_string(), |b| b.name.clone()),
        )
}
