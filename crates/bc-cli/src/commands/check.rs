//! Check command: validate the catalog and summarize it.

use std::io::Write;

use anyhow::Result;

use super::util::load_catalog;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;

    let slots: usize = catalog.seasons().iter().map(|s| s.schedule.len()).sum();
    writeln!(writer, "Catalog OK: {}", config.catalog_path.display())?;
    writeln!(writer, "Seasons: {}", catalog.seasons().len())?;
    writeln!(writer, "Birds: {}", catalog.birds().count())?;
    writeln!(writer, "Schedule slots: {slots}")?;

    let idle: Vec<&str> = catalog
        .seasons()
        .iter()
        .filter(|s| s.schedule.is_empty())
        .map(|s| s.id.as_str())
        .collect();
    if !idle.is_empty() {
        writeln!(writer, "Seasons without birds: {}", idle.join(", "))?;
    }
    Ok(())
}
