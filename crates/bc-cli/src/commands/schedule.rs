//! Schedule command: months, quiet hours and merged slots per season.

use std::io::Write;

use anyhow::{Result, bail};
use bc_core::{ScheduleCatalog, SeasonEntry, SeasonId};

pub fn run<W: Write>(
    writer: &mut W,
    catalog: &ScheduleCatalog,
    season: Option<&str>,
) -> Result<()> {
    let seasons: Vec<&SeasonEntry> = match season {
        Some(id) => {
            let found = SeasonId::new(id).ok().and_then(|id| catalog.find_season(&id));
            let Some(entry) = found else {
                let known: Vec<&str> =
                    catalog.seasons().iter().map(|s| s.id.as_str()).collect();
                bail!("unknown season: {id} (known: {})", known.join(", "));
            };
            vec![entry]
        }
        None => catalog.seasons().iter().collect(),
    };

    for (i, entry) in seasons.into_iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        write_season(writer, catalog, entry)?;
    }
    Ok(())
}

fn write_season<W: Write>(
    writer: &mut W,
    catalog: &ScheduleCatalog,
    entry: &SeasonEntry,
) -> Result<()> {
    let months: Vec<String> = entry.months.iter().map(ToString::to_string).collect();
    writeln!(writer, "{} (months {})", entry.id, months.join(", "))?;

    let quiet = entry.quiet;
    let suffix = if quiet.crosses_midnight() { ", overnight" } else { "" };
    writeln!(writer, "  quiet {}-{}{suffix}", quiet.start, quiet.end)?;

    if entry.schedule.is_empty() {
        writeln!(writer, "  (no birds scheduled)")?;
        return Ok(());
    }
    for (time, bird) in &entry.schedule {
        let name = catalog.bird(bird).map_or(bird.as_str(), |b| b.name.as_str());
        writeln!(writer, "  {time}  {name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::util::fixtures::catalog;

    #[test]
    fn schedule_lists_every_season() {
        let mut out = Vec::new();
        run(&mut out, &catalog(), None).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        autumn (months 9, 10, 11)
          quiet 21:00-07:00, overnight
          (no birds scheduled)

        spring (months 3, 4, 5)
          quiet 22:00-06:00, overnight
          07:00  Robin
          08:00  Blackbird
          12:00  Robin
          18:00  Blackbird

        summer (months 6, 7, 8)
          quiet 22:30-05:00, overnight
          06:00  Blackbird

        winter (months 1, 2, 12)
          quiet 20:00-07:30, overnight
          08:00  Robin
        ");
    }

    #[test]
    fn schedule_filters_one_season() {
        let mut out = Vec::new();
        run(&mut out, &catalog(), Some("summer")).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        summer (months 6, 7, 8)
          quiet 22:30-05:00, overnight
          06:00  Blackbird
        ");
    }

    #[test]
    fn unknown_season_is_an_error() {
        let mut out = Vec::new();
        let err = run(&mut out, &catalog(), Some("monsoon")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown season: monsoon (known: autumn, spring, summer, winter)"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn empty_season_is_unknown() {
        let mut out = Vec::new();
        let err = run(&mut out, &catalog(), Some("")).unwrap_err();
        assert!(err.to_string().starts_with("unknown season: "));
    }
}
