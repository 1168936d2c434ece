//! CLI subcommand implementations.

pub mod check;
pub mod resolve;
pub mod run;
pub mod schedule;
pub mod util;
