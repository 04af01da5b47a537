use crate::{NoteEvent, NoteTrack, Result};

use super::check_unit;

const BRAILLE_BLOCK: std::ops::RangeInclusive<char> = '\u{2800}'..='\u{28FF}';

/// Dot bit, column (0 = left, 1 = right) and pitch for each of the six dots.
///
/// The Unicode pattern offset stores dot N in bit N-1. The left column
/// (dots 1-3) sounds first, top dot highest.
const DOTS: [(u32, u64, i32); 6] = [
    (0, 0, 62),
    (1, 0, 61),
    (2, 0, 60),
    (3, 1, 62),
    (4, 1, 61),
    (5, 1, 60),
];

/// Encodes Braille cells as two columns of up to three notes.
///
/// Only characters from the Braille Patterns block are read; dots 7 and 8 are
/// ignored. Each cell takes two units, blank cells included.
pub fn from_braille(text: &str, unit: u64) -> Result<NoteTrack> {
    check_unit(unit)?;

    let mut events = Vec::new();
    let mut current = 0;
    for cell in text.chars().filter(|c| BRAILLE_BLOCK.contains(c)) {
        let mask = (cell as u32 - 0x2800) & 0x3F;
        for (bit, column, pitch) in DOTS {
            if mask & (1 << bit) != 0 {
                let start = current + column * unit;
                events.push(NoteEvent::new(start, start + unit, pitch)?);
            }
        }
        current += 2 * unit;
    }

    tracing::debug!(notes = events.len(), "encoded braille text");
    Ok(NoteTrack::from_events(events))
}
