//! Bird clock CLI library.
//!
//! This crate wires the core resolver and state tracker to the console, the
//! display frame file, audio playback and button input.

mod cli;
pub mod commands;
mod config;
pub mod media;
pub mod sources;

pub use cli::{Cli, Commands};
pub use config::{Config, Mode};
