//! Core library for the SBAN MIDI tools.
//!
//! Everything revolves around [`NoteTrack`], a list of notes with a start and a
//! stop tick on a 480 ticks-per-beat clock. Tracks are built from text
//! (numbers, Morse code, Braille) or from note-on/note-off message streams,
//! and can be written back as streams and MIDI files, read back as Morse,
//! rendered to piano-roll rasters and animations, or mirrored in time.

pub mod config;
pub mod error;
pub mod export;
pub mod midi;
pub mod render;
pub mod stream;
pub mod text;
pub mod timeline;
pub mod track;

pub use config::{AppConfig, MorseAlphabet, RenderConfig, TextConfig};
pub use error::{Result, SbanMidiError};
pub use export::{export_animation, ExportSettings, FrameSink, ImageEncoder, ImageExport};
pub use midi::{load_track, read_smf, save_track, write_smf};
pub use render::{Animation, Canvas, Progress, Raster};
pub use stream::{EventStream, MessageKind, TimedMessage};
pub use text::{from_braille, from_morse, from_number, to_morse};
pub use timeline::{ChangeDetector, Playhead};
pub use track::{NoteEvent, NoteTrack};
