//! Delta-time note-on/note-off message streams and their conversion to and
//! from [`NoteTrack`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{NoteEvent, NoteTrack, Result, SbanMidiError};

/// Ticks per quarter note of the canonical clock every track is stored in.
pub const CANONICAL_RESOLUTION: u16 = 480;

/// Velocity written for every serialized note-on.
pub const DEFAULT_VELOCITY: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// A note-on with velocity 0 behaves exactly like a note-off.
    NoteOn { pitch: i32, velocity: u8 },
    NoteOff { pitch: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedMessage {
    /// Ticks since the previous message. Negative values are rejected by
    /// [`parse`].
    pub delta: i64,
    pub kind: MessageKind,
}

impl TimedMessage {
    pub fn note_on(delta: i64, pitch: i32) -> Self {
        Self {
            delta,
            kind: MessageKind::NoteOn {
                pitch,
                velocity: DEFAULT_VELOCITY,
            },
        }
    }

    pub fn note_off(delta: i64, pitch: i32) -> Self {
        Self {
            delta,
            kind: MessageKind::NoteOff { pitch },
        }
    }
}

/// Single-track message sequence together with its pulses-per-quarter-note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    pub resolution: u16,
    pub messages: Vec<TimedMessage>,
}

impl EventStream {
    pub fn new(resolution: u16) -> Self {
        Self {
            resolution,
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: TimedMessage) {
        self.messages.push(message);
    }
}

/// Rebuilds notes from a message stream.
///
/// Deltas are rescaled to [`CANONICAL_RESOLUTION`] with a truncated integer
/// factor. A note-off closes the most recently opened note of the same pitch.
/// Note-offs without an open note are ignored, notes still open at the end of
/// the stream are dropped, and notes whose stop equals their start are
/// discarded.
pub fn parse(stream: &EventStream) -> Result<NoteTrack> {
    if stream.resolution == 0 {
        return Err(SbanMidiError::stream("resolution must be positive"));
    }

    let scale = u64::from(CANONICAL_RESOLUTION / stream.resolution);
    if CANONICAL_RESOLUTION % stream.resolution != 0 {
        tracing::warn!(
            resolution = stream.resolution,
            scale,
            "resolution does not divide the canonical clock, timing will be truncated"
        );
    }

    let mut builder = TrackBuilder::default();
    let mut time: u64 = 0;

    for (index, message) in stream.messages.iter().enumerate() {
        let delta = u64::try_from(message.delta).map_err(|_| {
            SbanMidiError::stream(format!(
                "message {index} has negative delta {}",
                message.delta
            ))
        })?;
        time = delta
            .checked_mul(scale)
            .and_then(|scaled| time.checked_add(scaled))
            .ok_or_else(|| SbanMidiError::stream(format!("message {index} overflows the clock")))?;

        match message.kind {
            MessageKind::NoteOn { pitch, velocity } if velocity > 0 => builder.open(time, pitch),
            MessageKind::NoteOn { pitch, .. } | MessageKind::NoteOff { pitch } => {
                builder.close(time, pitch)
            }
        }
    }

    Ok(builder.finish())
}

/// Flattens a track back into a canonical-resolution message stream.
///
/// Note-offs are emitted in stop order, each one before the first note-on that
/// starts at or after it. Notes still sounding when the next one starts stay
/// pending, so every delta is non-negative. A delta that does not fit the
/// message clock is an [`SbanMidiError::InvalidEventStream`].
pub fn serialize(track: &NoteTrack) -> Result<EventStream> {
    let mut stream = EventStream::new(CANONICAL_RESOLUTION);
    stream.messages.reserve(track.len() * 2);

    // Pending notes, ascending by stop; equal stops keep insertion order.
    let mut open: Vec<NoteEvent> = Vec::new();
    let mut time: u64 = 0;

    for event in track {
        let due = open.partition_point(|pending| pending.stop() <= event.start());
        for pending in open.drain(..due) {
            stream.push(TimedMessage::note_off(delta(pending.stop(), time)?, pending.pitch()));
            time = pending.stop();
        }

        stream.push(TimedMessage::note_on(delta(event.start(), time)?, event.pitch()));
        time = event.start();

        let at = open.partition_point(|pending| pending.stop() <= event.stop());
        open.insert(at, *event);
    }

    for pending in open {
        stream.push(TimedMessage::note_off(delta(pending.stop(), time)?, pending.pitch()));
        time = pending.stop();
    }

    Ok(stream)
}

fn delta(at: u64, time: u64) -> Result<i64> {
    at.checked_sub(time)
        .and_then(|ticks| i64::try_from(ticks).ok())
        .ok_or_else(|| SbanMidiError::stream(format!("cannot step from tick {time} to tick {at}")))
}

#[derive(Debug, Clone, Copy)]
struct OpenNote {
    start: u64,
    pitch: i32,
    stop: Option<u64>,
}

/// Collects notes in note-on order while they are matched with note-offs.
#[derive(Debug, Default)]
struct TrackBuilder {
    notes: Vec<OpenNote>,
    /// Indices into `notes` of unmatched notes, per pitch, oldest first.
    unmatched: HashMap<i32, Vec<usize>>,
}

impl TrackBuilder {
    fn open(&mut self, time: u64, pitch: i32) {
        self.unmatched.entry(pitch).or_default().push(self.notes.len());
        self.notes.push(OpenNote {
            start: time,
            pitch,
            stop: None,
        });
    }

    fn close(&mut self, time: u64, pitch: i32) {
        match self.unmatched.get_mut(&pitch).and_then(Vec::pop) {
            Some(index) => self.notes[index].stop = Some(time),
            None => tracing::debug!(pitch, time, "ignoring note-off without an open note"),
        }
    }

    fn finish(self) -> NoteTrack {
        let total = self.notes.len();
        let events: Vec<NoteEvent> = self
            .notes
            .into_iter()
            .filter_map(|note| {
                let stop = note.stop?;
                NoteEvent::new(note.start, stop, note.pitch).ok()
            })
            .collect();

        if events.len() < total {
            tracing::debug!(
                dropped = total - events.len(),
                "dropped notes that were never closed or had zero length"
            );
        }

        NoteTrack::from_events(events)
    }
}
