use std::collections::BTreeSet;

use crate::{NoteEvent, NoteTrack};

/// Read-only cursor over a track's timeline.
#[derive(Debug, Clone, Copy)]
pub struct Playhead<'a> {
    track: &'a NoteTrack,
}

impl<'a> Playhead<'a> {
    pub fn new(track: &'a NoteTrack) -> Self {
        Self { track }
    }

    /// Notes sounding at `tick` (`start <= tick < stop`).
    pub fn sounding_at(&self, tick: u64) -> impl Iterator<Item = &'a NoteEvent> + 'a {
        let track = self.track;
        track.iter().filter(move |event| event.sounds_at(tick))
    }

    /// Notes that have started by `tick`, whether or not they still sound.
    pub fn started_by(&self, tick: u64) -> impl Iterator<Item = &'a NoteEvent> + 'a {
        let track = self.track;
        track.iter().take_while(move |event| event.start() <= tick)
    }

    /// Sorted distinct ticks where any note starts or stops.
    ///
    /// The set of sounding notes is constant between two consecutive
    /// boundaries.
    pub fn boundaries(&self) -> Vec<u64> {
        let ticks: BTreeSet<u64> = self
            .track
            .iter()
            .flat_map(|event| [event.start(), event.stop()])
            .collect();
        ticks.into_iter().collect()
    }

    /// Ticks at which the set of sounding notes differs from the tick before
    /// and is not empty, in ascending order.
    pub fn change_points(&self) -> Vec<u64> {
        let mut detector = ChangeDetector::default();
        self.boundaries()
            .into_iter()
            .filter(|&tick| detector.observe(self.sounding_at(tick)))
            .collect()
    }
}

/// Remembers the previous sounding set and reports texture changes.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    previous: BTreeSet<(i32, u64, u64)>,
}

impl ChangeDetector {
    /// Records `sounding` as the current set. Returns `true` when it differs
    /// from the previous one and is not empty.
    pub fn observe<'e>(&mut self, sounding: impl IntoIterator<Item = &'e NoteEvent>) -> bool {
        let current: BTreeSet<(i32, u64, u64)> = sounding
            .into_iter()
            .map(|event| (event.pitch(), event.start(), event.stop()))
            .collect();
        let changed = !current.is_empty() && current != self.previous;
        self.previous = current;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(start: u64, stop: u64, pitch: i32) -> NoteEvent {
        NoteEvent::new(start, stop, pitch).unwrap()
    }

    fn track() -> NoteTrack {
        NoteTrack::from_events(vec![
            note(0, 100, 60),
            note(50, 150, 62),
            note(150, 200, 62),
            note(300, 400, 64),
            note(300, 400, 64),
        ])
    }

    /// Tick-by-tick scan from 0 to `max_stop`.
    fn brute_force(track: &NoteTrack) -> Vec<u64> {
        let playhead = Playhead::new(track);
        let mut detector = ChangeDetector::default();
        (0..=track.max_stop())
            .filter(|&tick| detector.observe(playhead.sounding_at(tick)))
            .collect()
    }

    #[test]
    fn sounding_excludes_stop_tick() {
        let track = track();
        let playhead = Playhead::new(&track);
        let pitches: Vec<i32> = playhead.sounding_at(100).map(|e| e.pitch()).collect();
        assert_eq!(pitches, vec![62]);
    }

    #[test]
    fn started_by_is_cumulative() {
        let track = track();
        let playhead = Playhead::new(&track);
        assert_eq!(playhead.started_by(150).count(), 3);
        assert_eq!(playhead.started_by(0).count(), 1);
    }

    #[test]
    fn boundaries_are_sorted_and_distinct() {
        let track = track();
        assert_eq!(
            Playhead::new(&track).boundaries(),
            vec![0, 50, 100, 150, 200, 300, 400]
        );
    }

    #[test]
    fn change_points_match_tick_by_tick_scan() {
        let track = track();
        let points = Playhead::new(&track).change_points();
        assert_eq!(points, vec![0, 50, 100, 150, 300]);
        assert_eq!(points, brute_force(&track));
    }

    #[test]
    fn silence_at_start_is_not_a_change() {
        let track = NoteTrack::from_events(vec![note(30, 40, 1)]);
        assert_eq!(Playhead::new(&track).change_points(), vec![30]);
        assert_eq!(brute_force(&track), vec![30]);
    }

    #[test]
    fn detector_ignores_empty_sets() {
        let mut detector = ChangeDetector::default();
        let event = note(0, 10, 60);
        assert!(detector.observe([&event]));
        assert!(!detector.observe([&event]));
        assert!(!detector.observe(std::iter::empty()));
        assert!(detector.observe([&event]));
    }
}
