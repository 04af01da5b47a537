use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, SbanMidiError};

/// A closed note interval `[start, stop)` in canonical ticks.
///
/// `stop` is always strictly after `start`; [`NoteEvent::new`] rejects
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "NoteFields")]
pub struct NoteEvent {
    start: u64,
    stop: u64,
    pitch: i32,
}

impl NoteEvent {
    pub fn new(start: u64, stop: u64, pitch: i32) -> Result<Self> {
        if stop <= start {
            return Err(SbanMidiError::InvalidInput("note must stop after it starts"));
        }
        Ok(Self { start, stop, pitch })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    pub fn duration(&self) -> u64 {
        self.stop - self.start
    }

    /// Whether the note is sounding at `tick`.
    pub fn sounds_at(&self, tick: u64) -> bool {
        self.start <= tick && tick < self.stop
    }
}

/// Unchecked wire form of a note.
#[derive(Deserialize)]
struct NoteFields {
    start: u64,
    stop: u64,
    pitch: i32,
}

impl TryFrom<NoteFields> for NoteEvent {
    type Error = SbanMidiError;

    fn try_from(fields: NoteFields) -> Result<Self> {
        Self::new(fields.start, fields.stop, fields.pitch)
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}@{}", self.start, self.stop, self.pitch)
    }
}

/// Ordered collection of notes.
///
/// Every public mutation leaves the notes stably sorted by `start` and keeps
/// [`NoteTrack::max_stop`] in sync with the contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NoteEvent>", into = "Vec<NoteEvent>")]
pub struct NoteTrack {
    events: Vec<NoteEvent>,
    max_stop: u64,
}

impl NoteTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a normalised track from notes in any order.
    pub fn from_events(events: Vec<NoteEvent>) -> Self {
        let mut track = Self { events, max_stop: 0 };
        track.normalize();
        track
    }

    pub fn push(&mut self, event: NoteEvent) {
        self.events.push(event);
        self.normalize();
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Latest stop across all notes, 0 for an empty track.
    pub fn max_stop(&self) -> u64 {
        self.max_stop
    }

    /// Mirrors the whole track in time around its own span.
    ///
    /// `max_stop` is unchanged, and applying the transform twice gives back
    /// the original notes.
    pub fn reverse(&mut self) {
        let end = self.max_stop;
        for event in &mut self.events {
            let (start, stop) = (event.start, event.stop);
            event.start = end - stop;
            event.stop = end - start;
        }
        self.normalize();
        tracing::debug!(notes = self.events.len(), end, "reversed track");
    }

    fn normalize(&mut self) {
        self.events.sort_by_key(|event| event.start);
        self.max_stop = self.events.iter().map(|e| e.stop).max().unwrap_or(0);
    }
}

impl From<Vec<NoteEvent>> for NoteTrack {
    fn from(events: Vec<NoteEvent>) -> Self {
        Self::from_events(events)
    }
}

impl From<NoteTrack> for Vec<NoteEvent> {
    fn from(track: NoteTrack) -> Self {
        track.events
    }
}

impl<'a> IntoIterator for &'a NoteTrack {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for NoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for event in &self.events {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{event}")?;
            first = false;
        }
        Ok(())
    }
}
