//! Display and audio collaborators driven by the state tracker.
//!
//! The core never touches images or audio directly. It calls these traits on
//! transitions and announce requests; the binary supplies filesystem-backed
//! implementations.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::BirdDefinition;
use crate::types::BirdId;

/// Recoverable failures reported by presenters and audio players.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The bird's image or clip directory does not exist.
    #[error("missing resource for {bird}: {}", path.display())]
    ResourceMissing { bird: BirdId, path: PathBuf },

    /// The bird's clip directory contains no playable clips.
    #[error("no sound clips available for {bird}")]
    NoClipsAvailable { bird: BirdId },

    /// The player could not be started.
    #[error("failed to play {} for {bird}: {source}", clip.display())]
    Playback {
        bird: BirdId,
        clip: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered output could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shows a bird on the clock's display.
pub trait Presenter {
    /// Displays `bird`. Called on every transition into an active state.
    fn display(&mut self, bird: &BirdDefinition) -> Result<(), MediaError>;
}

/// Plays sound clips for a bird.
pub trait AudioPlayer {
    /// Starts a randomly chosen clip for `bird` and returns its path.
    fn play_random(&mut self, bird: &BirdDefinition) -> Result<PathBuf, MediaError>;
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn display(&mut self, bird: &BirdDefinition) -> Result<(), MediaError> {
        (**self).display(bird)
    }
}

impl<T: AudioPlayer + ?Sized> AudioPlayer for Box<T> {
    fn play_random(&mut self, bird: &BirdDefinition) -> Result<PathBuf, MediaError> {
        (**self).play_random(bird)
    }
}
