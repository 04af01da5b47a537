//! Piano-roll rasters of a [`NoteTrack`].
//!
//! The canvas has one row per MIDI pitch (row `127 - pitch`) and one column
//! per `ticks_per_dot` ticks. Notes are drawn as one-pixel-high segments in
//! opaque white.

use serde::{Deserialize, Serialize};

use crate::{export::FrameSink, timeline::Playhead, NoteEvent, NoteTrack, Result, SbanMidiError};

pub const CANVAS_HEIGHT: u32 = 128;

pub const FOREGROUND: [u8; 4] = [255, 255, 255, 255];
/// Background of still images.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
/// Background of progress and animation frames.
pub const SHADE: [u8; 4] = [0, 0, 0, 100];

/// Length of one beat in milliseconds at the fixed 100 BPM playback tempo.
const BEAT_MS: f64 = 600.0;

/// Which notes appear in each frame of a progressive rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Progress {
    /// A single still image of every note.
    #[default]
    None,
    /// Every note that has started so far.
    Line,
    /// Only the notes sounding at the frame's tick.
    Point,
}

/// RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, background: [u8; 4]) -> Self {
        let pixels = background.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }

    /// Row-major RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Paints columns `x1..=x2` of row `y`, clipped to the canvas.
    fn fill_row(&mut self, y: u32, x1: u32, x2: u32, color: [u8; 4]) {
        if y >= self.height || x1 >= self.width {
            return;
        }
        let x2 = x2.min(self.width - 1);
        for x in x1..=x2 {
            let offset = self.offset(x, y);
            self.pixels[offset..offset + 4].copy_from_slice(&color);
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Frames sampled at a fixed stride, played back at a constant rate.
#[derive(Debug, Clone)]
pub struct Animation {
    pub frames: Vec<Raster>,
    pub frame_duration_ms: f64,
}

/// Horizontal layout shared by every frame rendered from one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    ticks_per_dot: u64,
}

impl Canvas {
    pub fn for_track(track: &NoteTrack, ticks_per_dot: u64) -> Result<Self> {
        if ticks_per_dot == 0 {
            return Err(SbanMidiError::InvalidInput("ticks per dot must be positive"));
        }
        if track.is_empty() {
            return Err(SbanMidiError::EmptyTrack);
        }
        let width = u32::try_from(track.max_stop().div_ceil(ticks_per_dot))
            .map_err(|_| SbanMidiError::InvalidInput("track is too long to rasterise"))?;
        Ok(Self {
            width,
            ticks_per_dot,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn draw<'a>(
        &self,
        notes: impl IntoIterator<Item = &'a NoteEvent>,
        background: [u8; 4],
    ) -> Raster {
        let mut raster = Raster::new(self.width, CANVAS_HEIGHT, background);
        for note in notes {
            let Ok(y) = u32::try_from(127 - i64::from(note.pitch())) else {
                continue;
            };
            let x1 = self.column(note.start());
            let x2 = self.column(note.stop()).saturating_sub(1).max(x1);
            raster.fill_row(y, x1, x2, FOREGROUND);
        }
        raster
    }

    fn column(&self, tick: u64) -> u32 {
        u32::try_from(tick / self.ticks_per_dot).unwrap_or(u32::MAX)
    }
}

/// Draws every note of the track into one image.
pub fn render_still(track: &NoteTrack, ticks_per_dot: u64) -> Result<Raster> {
    let canvas = Canvas::for_track(track, ticks_per_dot)?;
    Ok(canvas.draw(track, TRANSPARENT))
}

/// Streams one frame into `sink` each time the set of sounding notes changes
/// to a non-empty set. Returns the number of frames written.
///
/// With [`Progress::Line`] a frame shows every note started so far; with
/// [`Progress::Point`] only the notes sounding at that tick.
pub fn render_progress(
    track: &NoteTrack,
    ticks_per_dot: u64,
    progress: Progress,
    sink: &mut dyn FrameSink,
) -> Result<usize> {
    let canvas = Canvas::for_track(track, ticks_per_dot)?;
    let playhead = Playhead::new(track);

    let mut index = 0;
    for tick in playhead.change_points() {
        let frame = frame_at(&canvas, &playhead, tick, progress)?;
        sink.write_frame(index, &frame)?;
        index += 1;
    }

    tracing::debug!(frames = index, ?progress, "rendered progress frames");
    Ok(index)
}

/// Collects the frames of [`render_progress`] in memory.
pub fn progress_frames(
    track: &NoteTrack,
    ticks_per_dot: u64,
    progress: Progress,
) -> Result<Vec<Raster>> {
    let mut frames = Vec::new();
    render_progress(track, ticks_per_dot, progress, &mut frames)?;
    Ok(frames)
}

/// Samples a frame every `ticks_per_dot` ticks over `[0, max_stop)`.
///
/// Returns `None` when fewer than two frames result.
pub fn animate(track: &NoteTrack, ticks_per_dot: u64, progress: Progress) -> Result<Option<Animation>> {
    let canvas = Canvas::for_track(track, ticks_per_dot)?;
    let playhead = Playhead::new(track);

    let frames = (0..track.max_stop())
        .step_by(usize::try_from(ticks_per_dot).unwrap_or(usize::MAX))
        .map(|tick| frame_at(&canvas, &playhead, tick, progress))
        .collect::<Result<Vec<_>>>()?;

    if frames.len() < 2 {
        tracing::debug!(frames = frames.len(), "too few frames for an animation");
        return Ok(None);
    }

    Ok(Some(Animation {
        frames,
        frame_duration_ms: frame_duration_ms(ticks_per_dot),
    }))
}

/// Display time of one animation frame at 100 BPM.
pub fn frame_duration_ms(ticks_per_dot: u64) -> f64 {
    let dots_per_beat = f64::from(crate::stream::CANONICAL_RESOLUTION) / ticks_per_dot as f64;
    BEAT_MS / dots_per_beat
}

fn frame_at(canvas: &Canvas, playhead: &Playhead<'_>, tick: u64, progress: Progress) -> Result<Raster> {
    match progress {
        Progress::Line => Ok(canvas.draw(playhead.started_by(tick), SHADE)),
        Progress::Point => Ok(canvas.draw(playhead.sounding_at(tick), SHADE)),
        Progress::None => Err(SbanMidiError::InvalidInput(
            "progressive rendering needs the line or point mode",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(raster: &Raster) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                if raster.pixel(x, y) == Some(FOREGROUND) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn note(start: u64, stop: u64, pitch: i32) -> NoteEvent {
        NoteEvent::new(start, stop, pitch).unwrap()
    }

    fn track(events: Vec<NoteEvent>) -> NoteTrack {
        NoteTrack::from_events(events)
    }

    #[test]
    fn single_note_paints_one_pixel() {
        let raster = render_still(&track(vec![note(0, 80, 60)]), 80).unwrap();

        assert_eq!(raster.width(), 1);
        assert_eq!(raster.height(), 128);
        assert_eq!(painted(&raster), vec![(0, 67)]);
        assert_eq!(raster.pixel(0, 0), Some(TRANSPARENT));
    }

    #[test]
    fn width_rounds_up() {
        let raster = render_still(&track(vec![note(0, 170, 0)]), 80).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(painted(&raster), vec![(0, 127), (1, 127)]);
    }

    #[test]
    fn short_note_still_gets_a_pixel() {
        let raster = render_still(
            &track(vec![note(0, 400, 1), note(100, 110, 127)]),
            80,
        )
        .unwrap();
        assert!(painted(&raster).contains(&(1, 0)));
    }

    #[test]
    fn long_note_spans_columns() {
        let raster = render_still(&track(vec![note(80, 400, 64)]), 80).unwrap();
        assert_eq!(
            painted(&raster),
            vec![(1, 63), (2, 63), (3, 63), (4, 63)]
        );
    }

    #[test]
    fn out_of_range_pitches_are_clipped() {
        let raster = render_still(
            &track(vec![note(0, 80, 200), note(0, 80, -3)]),
            80,
        )
        .unwrap();
        assert!(painted(&raster).is_empty());
    }

    #[test]
    fn empty_track_is_an_error() {
        let err = render_still(&NoteTrack::new(), 80).unwrap_err();
        assert!(matches!(err, SbanMidiError::EmptyTrack));
        assert!(matches!(
            animate(&NoteTrack::new(), 80, Progress::Point),
            Err(SbanMidiError::EmptyTrack)
        ));
    }

    #[test]
    fn zero_ticks_per_dot_is_an_error() {
        let err = render_still(&track(vec![note(0, 80, 60)]), 0).unwrap_err();
        assert!(matches!(err, SbanMidiError::InvalidInput(_)));
    }

    #[test]
    fn line_progress_accumulates_notes() {
        let notes = track(vec![
            note(0, 80, 60),
            note(80, 160, 62),
            note(240, 320, 64),
        ]);
        let frames = progress_frames(&notes, 80, Progress::Line).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(painted(&frames[0]), vec![(0, 67)]);
        assert_eq!(painted(&frames[1]), vec![(1, 65), (0, 67)]);
        assert_eq!(painted(&frames[2]), vec![(3, 63), (1, 65), (0, 67)]);
        assert_eq!(frames[0].pixel(2, 0), Some(SHADE));
    }

    #[test]
    fn point_progress_shows_only_sounding_notes() {
        let notes = track(vec![
            note(0, 160, 60),
            note(80, 160, 62),
        ]);
        let frames = progress_frames(&notes, 80, Progress::Point).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(painted(&frames[0]), vec![(0, 67), (1, 67)]);
        assert_eq!(painted(&frames[1]), vec![(1, 65), (0, 67), (1, 67)]);
    }

    #[test]
    fn repeated_texture_after_silence_emits_again() {
        let notes = track(vec![note(0, 80, 60), note(160, 240, 60)]);
        let frames = progress_frames(&notes, 80, Progress::Point).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn progress_indices_increment() {
        struct Indices(Vec<usize>);
        impl FrameSink for Indices {
            fn write_frame(&mut self, index: usize, _frame: &Raster) -> Result<()> {
                self.0.push(index);
                Ok(())
            }
        }

        let notes = track(vec![
            note(0, 10, 60),
            note(20, 30, 61),
            note(40, 50, 62),
        ]);
        let mut sink = Indices(Vec::new());
        let count = render_progress(&notes, 10, Progress::Line, &mut sink).unwrap();

        assert_eq!(count, 3);
        assert_eq!(sink.0, vec![0, 1, 2]);
    }

    #[test]
    fn progress_rejects_still_mode() {
        let notes = track(vec![note(0, 80, 60)]);
        assert!(progress_frames(&notes, 80, Progress::None).is_err());
    }

    #[test]
    fn animation_samples_every_dot() {
        let notes = track(vec![
            note(0, 80, 60),
            note(160, 240, 62),
        ]);
        let animation = animate(&notes, 80, Progress::Point).unwrap().unwrap();

        assert_eq!(animation.frames.len(), 3);
        assert_eq!(painted(&animation.frames[0]), vec![(0, 67)]);
        assert!(painted(&animation.frames[1]).is_empty());
        assert_eq!(painted(&animation.frames[2]), vec![(2, 65)]);
        assert_eq!(animation.frame_duration_ms, 100.0);
    }

    #[test]
    fn line_animation_keeps_trail() {
        let notes = track(vec![
            note(0, 80, 60),
            note(160, 240, 62),
        ]);
        let animation = animate(&notes, 80, Progress::Line).unwrap().unwrap();
        assert_eq!(painted(&animation.frames[1]), vec![(0, 67)]);
    }

    #[test]
    fn single_frame_animation_is_skipped() {
        let notes = track(vec![note(0, 80, 60)]);
        assert!(animate(&notes, 80, Progress::Point).unwrap().is_none());
    }

    #[test]
    fn frame_duration_follows_100_bpm() {
        assert_eq!(frame_duration_ms(480), 600.0);
        assert_eq!(frame_duration_ms(120), 150.0);
    }
}
