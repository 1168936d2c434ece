//! Resolve command: the clock's state at a single point in time.

use std::io::Write;

use anyhow::Result;
use bc_core::{ResolvedState, Resolver};
use chrono::NaiveDateTime;
use serde::Serialize;

use super::util::describe_state;

/// JSON output of `birdclock resolve --json`.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub state: ResolvedState,
    /// Display name of the active bird.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    resolver: &Resolver,
    at: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let state = resolver.resolve(at);
    tracing::debug!(%at, %state, "resolved");

    if json {
        let name = state
            .bird()
            .and_then(|id| resolver.catalog().bird(id))
            .map(|bird| bird.name.clone());
        let report = ResolveReport {
            timestamp: at,
            state,
            name,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "Current time: {} - {}", at.format("%H:%M"), state.season())?;
    writeln!(
        writer,
        "Current bird: {}",
        describe_state(resolver.catalog(), &state)
    )?;
    Ok(())
}
