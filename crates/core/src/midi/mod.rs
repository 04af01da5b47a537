//! Standard MIDI File reading and writing on top of `midly`.
//!
//! Only note-on and note-off messages are kept. Tempo, track names, channels
//! and every other event are discarded, although their delta times still
//! count towards the timing of the next note message.

use std::path::Path;

use midly::{
    num::{u15, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::{
    stream::{self, EventStream, MessageKind, TimedMessage, DEFAULT_VELOCITY},
    NoteTrack, Result, SbanMidiError,
};

const MAX_DELTA: u32 = (1 << 28) - 1;

/// Extracts the note messages of every track into one stream.
///
/// Tracks are read one after another on a single running clock, so a second
/// track starts where the first one ended.
pub fn read_smf(bytes: &[u8]) -> Result<EventStream> {
    let smf = Smf::parse(bytes)?;
    let resolution = match smf.header.timing {
        Timing::Metrical(ticks_per_beat) => ticks_per_beat.as_int(),
        Timing::Timecode(..) => {
            return Err(SbanMidiError::stream("timecode-based timing is not supported"))
        }
    };

    let mut stream = EventStream::new(resolution);
    let mut pending: i64 = 0;
    for track in &smf.tracks {
        for event in track {
            pending += i64::from(event.delta.as_int());
            let kind = match event.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => MessageKind::NoteOn {
                    pitch: i32::from(key.as_int()),
                    velocity: vel.as_int(),
                },
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { key, .. },
                    ..
                } => MessageKind::NoteOff {
                    pitch: i32::from(key.as_int()),
                },
                _ => continue,
            };
            stream.push(TimedMessage {
                delta: pending,
                kind,
            });
            pending = 0;
        }
    }

    tracing::debug!(
        tracks = smf.tracks.len(),
        messages = stream.messages.len(),
        resolution,
        "read midi file"
    );
    Ok(stream)
}

/// Encodes `stream` as a format 0 file on channel 0.
pub fn write_smf(stream: &EventStream) -> Result<Vec<u8>> {
    if stream.resolution == 0 || stream.resolution > 0x7FFF {
        return Err(SbanMidiError::stream(format!(
            "resolution {} cannot be stored in a midi header",
            stream.resolution
        )));
    }
    let resolution = u15::new(stream.resolution);

    let mut events = Vec::with_capacity(stream.messages.len() + 1);
    for (index, message) in stream.messages.iter().enumerate() {
        let delta = u32::try_from(message.delta)
            .ok()
            .filter(|delta| *delta <= MAX_DELTA)
            .ok_or_else(|| {
                SbanMidiError::stream(format!("message {index} has unencodable delta {}", message.delta))
            })?;
        let message = match message.kind {
            MessageKind::NoteOn { pitch, velocity } => MidiMessage::NoteOn {
                key: key(pitch)?,
                vel: u7::new(velocity.min(127)),
            },
            MessageKind::NoteOff { pitch } => MidiMessage::NoteOff {
                key: key(pitch)?,
                vel: u7::new(DEFAULT_VELOCITY),
            },
        };
        events.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        });
    }
    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(resolution),
        },
        tracks: vec![events],
    };

    let mut out = Vec::new();
    smf.write_std(&mut out)?;
    Ok(out)
}

/// Reads and parses a `.mid` file into a track.
pub fn load_track(path: &Path) -> Result<NoteTrack> {
    let bytes = std::fs::read(path)?;
    let track = stream::parse(&read_smf(&bytes)?)?;
    tracing::info!(?path, notes = track.len(), "loaded track");
    Ok(track)
}

/// Serializes a track and writes it as a `.mid` file.
pub fn save_track(track: &NoteTrack, path: &Path) -> Result<()> {
    let bytes = write_smf(&stream::serialize(track)?)?;
    std::fs::write(path, bytes)?;
    tracing::info!(?path, notes = track.len(), "saved track");
    Ok(())
}

fn key(pitch: i32) -> Result<u7> {
    match u8::try_from(pitch) {
        Ok(key) if key <= 127 => Ok(u7::new(key)),
        _ => Err(SbanMidiError::stream(format!("pitch {pitch} is outside 0..=127"))),
    }
}
