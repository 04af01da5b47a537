//! Text encodings of a [`NoteTrack`]: base-36 numbers, Morse code and
//! six-dot Braille.
//!
//! Every encoder walks the input once, appending closed notes at a monotonic
//! cursor, so encoded tracks never contain overlapping notes. Characters an
//! encoder does not recognise are skipped without advancing the cursor.

mod braille;

pub use braille::from_braille;

use crate::{config::MorseAlphabet, NoteEvent, NoteTrack, Result, SbanMidiError};

/// Pitch used for every Morse signal.
pub const MORSE_PITCH: i32 = 60;

/// Offset added to the base-36 value of a letter (`A` is 10).
const LETTER_OCTAVE: i32 = 60;

/// Encodes decimal digits and ASCII letters as one note each.
///
/// A digit becomes its own value as pitch, a letter its base-36 value shifted
/// up by [`LETTER_OCTAVE`], so `A` is 70 and `Z` is 95. Full-width digits
/// count the same as ASCII ones.
pub fn from_number(text: &str, unit: u64) -> Result<NoteTrack> {
    check_unit(unit)?;

    let mut events = Vec::new();
    let mut current = 0;
    for c in text.chars() {
        let pitch = if let Some(digit) = decimal_value(c) {
            digit as i32
        } else if c.is_ascii_alphabetic() {
            i32::from(c.to_ascii_uppercase() as u8 - b'A') + 10 + LETTER_OCTAVE
        } else {
            continue;
        };
        events.push(NoteEvent::new(current, current + unit, pitch)?);
        current += unit;
    }

    tracing::debug!(notes = events.len(), "encoded number text");
    Ok(NoteTrack::from_events(events))
}

/// Encodes Morse text: a dit is one unit long, a dah two, and a space is one
/// unit of silence.
pub fn from_morse(text: &str, unit: u64, alphabet: &MorseAlphabet) -> Result<NoteTrack> {
    check_unit(unit)?;

    let mut events = Vec::new();
    let mut current = 0;
    for c in text.chars() {
        if alphabet.is_dit(c) {
            events.push(NoteEvent::new(current, current + unit, MORSE_PITCH)?);
            current += unit;
        } else if alphabet.is_dah(c) {
            events.push(NoteEvent::new(current, current + 2 * unit, MORSE_PITCH)?);
            current += 2 * unit;
        } else if alphabet.is_space(c) {
            current += unit;
        }
    }

    tracing::debug!(notes = events.len(), "encoded morse text");
    Ok(NoteTrack::from_events(events))
}

/// Reads a track back as Morse text made of `.`, `-` and ` `.
///
/// Notes longer than `unit` become dahs, the rest dits. Any silence of at
/// least `unit` before a note becomes a single space, however long it is.
pub fn to_morse(track: &NoteTrack, unit: u64) -> String {
    let mut result = String::with_capacity(track.len() * 2);
    let mut previous_stop = 0;

    for event in track {
        if event.start() >= previous_stop && event.start() - previous_stop >= unit {
            result.push(' ');
        }
        result.push(if event.duration() > unit { '-' } else { '.' });
        previous_stop = event.stop();
    }

    result
}

fn decimal_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '\u{FF10}'..='\u{FF19}' => Some(c as u32 - 0xFF10),
        _ => None,
    }
}

pub(crate) fn check_unit(unit: u64) -> Result<()> {
    if unit == 0 {
        return Err(SbanMidiError::InvalidInput("unit duration must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(start: u64, stop: u64, pitch: i32) -> NoteEvent {
        NoteEvent::new(start, stop, pitch).unwrap()
    }

    fn alphabet() -> MorseAlphabet {
        MorseAlphabet::default()
    }

    #[test]
    fn digits_map_to_their_value() {
        let track = from_number("9", 120).unwrap();
        assert_eq!(track.events(), &[note(0, 120, 9)]);
    }

    #[test]
    fn letters_map_to_base36_octave() {
        let track = from_number("Az", 100).unwrap();
        assert_eq!(
            track.events(),
            &[note(0, 100, 70), note(100, 200, 95)]
        );
    }

    #[test]
    fn number_skips_unknown_characters_without_advancing() {
        let track = from_number("1 -é2", 10).unwrap();
        assert_eq!(
            track.events(),
            &[note(0, 10, 1), note(10, 20, 2)]
        );
    }

    #[test]
    fn rejects_zero_unit() {
        let err = from_number("1", 0).unwrap_err();
        assert!(matches!(err, SbanMidiError::InvalidInput(_)));
        assert!(from_morse(".", 0, &alphabet()).is_err());
    }

    #[test]
    fn single_dit() {
        let track = from_morse(".", 120, &alphabet()).unwrap();
        assert_eq!(track.events(), &[note(0, 120, 60)]);
    }

    #[test]
    fn single_dah() {
        let track = from_morse("-", 120, &alphabet()).unwrap();
        assert_eq!(track.events(), &[note(0, 240, 60)]);
    }

    #[test]
    fn space_leaves_a_gap() {
        let track = from_morse(". -", 120, &alphabet()).unwrap();
        assert_eq!(
            track.events(),
            &[note(0, 120, 60), note(240, 480, 60)]
        );
        let gap = track.events()[1].start() - track.events()[0].stop();
        assert!(gap >= 120);
    }

    #[test]
    fn accepts_full_width_alphabet() {
        let track = from_morse("・　ー_", 10, &alphabet()).unwrap();
        assert_eq!(
            track.events(),
            &[
                note(0, 10, 60),
                note(20, 40, 60),
                note(40, 60, 60),
            ]
        );
    }

    #[test]
    fn morse_ignores_unknown_characters() {
        let track = from_morse(".x.", 10, &alphabet()).unwrap();
        assert_eq!(
            track.events(),
            &[note(0, 10, 60), note(10, 20, 60)]
        );
    }

    #[test]
    fn custom_alphabet_is_honoured() {
        let custom = MorseAlphabet {
            dit: "o".to_string(),
            dah: "O".to_string(),
            space: "/".to_string(),
        };
        let track = from_morse("o/O.", 5, &custom).unwrap();
        assert_eq!(
            track.events(),
            &[note(0, 5, 60), note(10, 20, 60)]
        );
    }

    #[test]
    fn decodes_dits_dahs_and_gaps() {
        let track = from_morse(".- -..", 120, &alphabet()).unwrap();
        assert_eq!(to_morse(&track, 120), ".- -..");
    }

    #[test]
    fn decoding_collapses_long_gaps_to_one_space() {
        let track = from_morse(".   -", 120, &alphabet()).unwrap();
        assert_eq!(to_morse(&track, 120), ". -");
    }

    #[test]
    fn leading_silence_becomes_a_space() {
        let track = from_morse(" .", 120, &alphabet()).unwrap();
        assert_eq!(to_morse(&track, 120), " .");
    }

    #[test]
    fn overlapping_notes_never_count_as_gaps() {
        let track = NoteTrack::from_events(vec![
            note(0, 500, 60),
            note(100, 200, 61),
        ]);
        assert_eq!(to_morse(&track, 0), " --");
    }

    #[test]
    fn empty_track_decodes_to_empty_string() {
        assert_eq!(to_morse(&NoteTrack::new(), 120), "");
    }

    #[test]
    fn full_width_digits_count_as_digits() {
        let track = from_number("\u{FF11}\u{FF12}", 10).unwrap();
        assert_eq!(track.events(), &[note(0, 10, 1), note(10, 20, 2)]);

        let mixed = from_number("\u{FF10}9\u{FF19}", 10).unwrap();
        let pitches: Vec<i32> = mixed.iter().map(NoteEvent::pitch).collect();
        assert_eq!(pitches, vec![0, 9, 9]);
    }
}
