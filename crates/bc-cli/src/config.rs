//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bc_core::QuietRule;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// How the clock takes input and shows birds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Console commands drive a simulated clock; images are announced on stdout.
    #[default]
    Interactive,
    /// The real clock drives the state; buttons step and announce; images go
    /// to the display frame file.
    Deployed,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the bird catalog (JSON).
    pub catalog_path: PathBuf,

    /// Directory holding one `<slug>/` folder per bird with its image and clips.
    pub birds_dir: PathBuf,

    /// Default mode for `birdclock run`.
    pub mode: Mode,

    /// How often deployed mode re-reads the real clock.
    pub poll_interval_secs: u64,

    /// Minimum spacing between two presses of the same button.
    pub debounce_ms: u64,

    /// Quiet-window matching rule.
    pub quiet_rule: QuietRule,

    /// Player command for clips, e.g. `mpg123 -q`; the clip path is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_command: Option<String>,

    /// Image file the deployed display driver watches.
    pub frame_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let state_dir = dirs_state_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            catalog_path: PathBuf::from("bird_data.json"),
            birds_dir: PathBuf::from("birds"),
            mode: Mode::default(),
            poll_interval_secs: 30,
            debounce_ms: 300,
            quiet_rule: QuietRule::default(),
            audio_command: None,
            frame_path: state_dir.join("frame.jpg"),
        }
    }
}

impl Config {
    /// Loads configuration from default locations, optionally overlaid with a
    /// specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BIRDCLOCK_*)
        figment = figment.merge(Env::prefixed("BIRDCLOCK_"));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the clock cannot run with.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn validate(&self) -> Result<(), figment::Error> {
        if self.poll_interval_secs == 0 {
            return Err(figment::Error::from(
                "poll_interval_secs must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Debounce spacing as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Splits `audio_command` into program and arguments.
    ///
    /// Returns `None` when no command is configured or it is blank.
    #[must_use]
    pub fn audio_argv(&self) -> Option<Vec<String>> {
        let argv: Vec<String> = self
            .audio_command
            .as_deref()?
            .split_whitespace()
            .map(String::from)
            .collect();
        (!argv.is_empty()).then_some(argv)
    }
}

/// Returns the platform-specific config directory for birdclock.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("birdclock"))
}

/// Returns the platform-specific state directory for birdclock.
///
/// On Linux: `~/.local/state/birdclock`
fn dirs_state_path() -> Option<PathBuf> {
    dirs::state_dir().map(|p| p.join("birdclock"))
}
