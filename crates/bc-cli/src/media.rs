//! Filesystem-backed presenters and audio player.
//!
//! Every bird has a folder named after its slug under the birds directory:
//!
//! ```text
//! birds/
//!   european-robin/
//!     european-robin.jpg
//!     song-1.mp3
//!     alarm.mp3
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use bc_core::{AudioPlayer, BirdDefinition, MediaError, Presenter};
use rand::seq::SliceRandom;

/// Locates a bird's image and clips under the birds directory.
#[derive(Debug, Clone)]
pub struct AssetLayout {
    birds_dir: PathBuf,
}

impl AssetLayout {
    pub fn new(birds_dir: impl Into<PathBuf>) -> Self {
        Self {
            birds_dir: birds_dir.into(),
        }
    }

    /// `<birds_dir>/<slug>/`
    pub fn bird_dir(&self, bird: &BirdDefinition) -> PathBuf {
        self.birds_dir.join(&bird.slug)
    }

    /// `<birds_dir>/<slug>/<slug>.jpg`
    pub fn image_path(&self, bird: &BirdDefinition) -> PathBuf {
        self.bird_dir(bird).join(format!("{}.jpg", bird.slug))
    }

    /// Returns the bird's existing image path.
    pub fn existing_image(&self, bird: &BirdDefinition) -> Result<PathBuf, MediaError> {
        let path = self.image_path(bird);
        if path.is_file() {
            Ok(path)
        } else {
            Err(MediaError::ResourceMissing {
                bird: bird.id.clone(),
                path,
            })
        }
    }

    /// Lists the bird's `.mp3` clips in name order.
    pub fn clips(&self, bird: &BirdDefinition) -> Result<Vec<PathBuf>, MediaError> {
        let dir = self.bird_dir(bird);
        let entries = fs::read_dir(&dir).map_err(|_| MediaError::ResourceMissing {
            bird: bird.id.clone(),
            path: dir.clone(),
        })?;

        let mut clips: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_mp3(path))
            .collect();
        clips.sort();

        if clips.is_empty() {
            return Err(MediaError::NoClipsAvailable {
                bird: bird.id.clone(),
            });
        }
        Ok(clips)
    }
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

/// Announces images on a text stream (interactive mode).
#[derive(Debug)]
pub struct ConsolePresenter<W> {
    layout: AssetLayout,
    writer: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub const fn new(layout: AssetLayout, writer: W) -> Self {
        Self { layout, writer }
    }

    /// Returns the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn display(&mut self, bird: &BirdDefinition) -> Result<(), MediaError> {
        let path = self.layout.existing_image(bird)?;
        writeln!(
            self.writer,
            "Displaying image for {}: {}",
            bird.name,
            path.display()
        )
        .map_err(|source| MediaError::Output {
            path: PathBuf::from("<console>"),
            source,
        })
    }
}

/// Replaces the frame file watched by the display driver (deployed mode).
///
/// The image is copied next to the frame and renamed into place, so the
/// driver never reads a partially written file.
#[derive(Debug)]
pub struct FramePresenter {
    layout: AssetLayout,
    frame_path: PathBuf,
}

impl FramePresenter {
    pub const fn new(layout: AssetLayout, frame_path: PathBuf) -> Self {
        Self { layout, frame_path }
    }

    fn write_frame(&self, image: &Path) -> io::Result<()> {
        if let Some(parent) = self.frame_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.frame_path.with_extension("tmp");
        fs::copy(image, &staging)?;
        fs::rename(&staging, &self.frame_path)
    }
}

impl Presenter for FramePresenter {
    fn display(&mut self, bird: &BirdDefinition) -> Result<(), MediaError> {
        let image = self.layout.existing_image(bird)?;
        self.write_frame(&image)
            .map_err(|source| MediaError::Output {
                path: self.frame_path.clone(),
                source,
            })?;
        tracing::info!(bird = %bird.id, image = %image.display(), "frame updated");
        Ok(())
    }
}

/// Plays a random clip by spawning an external player.
///
/// Without a configured command the chosen clip is only logged.
#[derive(Debug)]
pub struct CommandAudioPlayer {
    layout: AssetLayout,
    argv: Option<Vec<String>>,
}

impl CommandAudioPlayer {
    pub const fn new(layout: AssetLayout, argv: Option<Vec<String>>) -> Self {
        Self { layout, argv }
    }

    fn spawn(argv: &[String], clip: &Path) -> io::Result<()> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };
        let mut child = Command::new(program)
            .args(args)
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Reap the player in the background so playback never blocks the clock.
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!(error = %e, "failed to reap audio player");
            }
        });
        Ok(())
    }
}

impl AudioPlayer for CommandAudioPlayer {
    fn play_random(&mut self, bird: &BirdDefinition) -> Result<PathBuf, MediaError> {
        let clips = self.layout.clips(bird)?;
        let clip = clips
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| MediaError::NoClipsAvailable {
                bird: bird.id.clone(),
            })?;

        match &self.argv {
            Some(argv) => Self::spawn(argv, &clip).map_err(|source| MediaError::Playback {
                bird: bird.id.clone(),
                clip: clip.clone(),
                source,
            })?,
            None => tracing::info!(clip = %clip.display(), "no audio command configured"),
        }
        Ok(clip)
    }
}
