use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    render::{self, Animation, Progress, Raster},
    NoteTrack, RenderConfig, Result, SbanMidiError,
};

/// Receives rendered frames in order.
pub trait FrameSink {
    fn write_frame(&mut self, index: usize, frame: &Raster) -> Result<()>;
}

impl FrameSink for Vec<Raster> {
    fn write_frame(&mut self, _index: usize, frame: &Raster) -> Result<()> {
        self.push(frame.clone());
        Ok(())
    }
}

/// Image container writer such as a PNG or GIF encoder.
pub trait ImageEncoder {
    fn encode_still(&self, path: &Path, raster: &Raster) -> Result<()>;

    fn encode_animation(&self, path: &Path, animation: &Animation) -> Result<()>;
}

/// Configuration options for image and animation export.
///
/// Usually taken from [`RenderConfig::image_settings`] or
/// [`RenderConfig::animation_settings`]; the default is the still-image setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub ticks_per_dot: u64,
    pub progress: Progress,
}

impl Default for ExportSettings {
    fn default() -> Self {
        RenderConfig::default().image_settings()
    }
}

/// Writes still or progress images of a track into one directory.
///
/// A still is saved as `<stem>.png`, progress frames as `<stem>-<index>.png`.
#[derive(Debug)]
pub struct ImageExport<'e, E> {
    dir: PathBuf,
    stem: String,
    encoder: &'e E,
}

impl<'e, E: ImageEncoder> ImageExport<'e, E> {
    /// Fails with [`SbanMidiError::InvalidDestination`] unless `dir` is an
    /// existing directory.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, encoder: &'e E) -> Result<Self> {
        let dir = dir.into();
        ensure_directory(&dir)?;
        Ok(Self {
            dir,
            stem: stem.into(),
            encoder,
        })
    }

    pub fn still_path(&self) -> PathBuf {
        self.dir.join(format!("{}.png", self.stem))
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}-{index}.png", self.stem))
    }

    /// Renders `track` and writes the resulting images. Returns how many
    /// files were written.
    pub fn export(&mut self, track: &NoteTrack, settings: &ExportSettings) -> Result<usize> {
        let written = match settings.progress {
            Progress::None => {
                let raster = render::render_still(track, settings.ticks_per_dot)?;
                self.encoder.encode_still(&self.still_path(), &raster)?;
                1
            }
            progress => render::render_progress(track, settings.ticks_per_dot, progress, self)?,
        };

        tracing::info!(dir = ?self.dir, written, progress = ?settings.progress, "exported images");
        Ok(written)
    }
}

impl<E: ImageEncoder> FrameSink for ImageExport<'_, E> {
    fn write_frame(&mut self, index: usize, frame: &Raster) -> Result<()> {
        self.encoder.encode_still(&self.frame_path(index), frame)
    }
}

/// Renders an animation of `track` and hands it to `encoder`.
///
/// The destination's directory is checked before anything is rendered.
/// Returns `false` without writing when the track yields fewer than two
/// frames.
pub fn export_animation<E: ImageEncoder>(
    track: &NoteTrack,
    path: &Path,
    settings: &ExportSettings,
    encoder: &E,
) -> Result<bool> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_directory(dir)?;

    let Some(animation) = render::animate(track, settings.ticks_per_dot, settings.progress)? else {
        tracing::info!(?path, "animation has fewer than two frames, nothing written");
        return Ok(false);
    };

    encoder.encode_animation(path, &animation)?;
    tracing::info!(?path, frames = animation.frames.len(), "exported animation");
    Ok(true)
}

fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SbanMidiError::InvalidDestination(dir.to_path_buf()))
    }
}
