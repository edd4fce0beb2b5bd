// Chords, tracks and the finished composition.
//
// A track is an append-only run of chords; each chord sounds for its
// duration and the next one starts where it ends, so there are no explicit
// start times until `Composition::note_events` flattens everything into
// track-local absolute time for the MIDI writer (see midi.rs).
//
// Instrument ids follow the General MIDI program numbers. A negative id marks
// a percussion track: it plays on the shared drum channel with program
// `-1 - id`.

use crate::error::{MusicError, Result};
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const DEFAULT_VELOCITY: u8 = 100;

/// Convert a computed pitch into a MIDI key.
pub fn midi_key(pitch: i64) -> Result<u8> {
    u8::try_from(pitch)
        .ok()
        .filter(|&key| key <= 127)
        .ok_or(MusicError::PitchOutOfRange(pitch))
}

/// Clamp a generated velocity into the MIDI range.
pub fn midi_velocity(velocity: i64) -> u8 {
    velocity.clamp(0, 127) as u8
}

/// One event of a track: simultaneous pitches, or a rest when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    /// Ascending, without duplicates.
    pitches: Vec<u8>,
    duration: Rational,
    velocity: u8,
}

impl Chord {
    /// Build a chord. Voices that landed on the same key collapse into one.
    pub fn new(mut pitches: Vec<u8>, duration: Rational, velocity: u8) -> Self {
        pitches.sort_unstable();
        pitches.dedup();
        Chord {
            pitches,
            duration,
            velocity: velocity.min(127),
        }
    }

    pub fn rest(duration: Rational) -> Self {
        Chord::new(Vec::new(), duration, DEFAULT_VELOCITY)
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    pub fn duration(&self) -> Rational {
        self.duration
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub instrument: i8,
    chords: Vec<Chord>,
}

impl Track {
    pub fn new(name: impl Into<String>, instrument: i8) -> Self {
        Track {
            name: name.into(),
            instrument,
            chords: Vec::new(),
        }
    }

    pub fn append_one(&mut self, chord: Chord) {
        self.chords.push(chord);
    }

    pub fn append_many(&mut self, chords: impl IntoIterator<Item = Chord>) {
        self.chords.extend(chords);
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn is_percussion(&self) -> bool {
        self.instrument < 0
    }

    /// General MIDI program number, with the percussion marker decoded.
    pub fn program(&self) -> u8 {
        if self.is_percussion() {
            (-1 - self.instrument as i16) as u8
        } else {
            self.instrument as u8
        }
    }

    /// Sum of all chord durations.
    pub fn length(&self) -> Rational {
        self.chords.iter().map(Chord::duration).sum()
    }
}

/// A single sounding pitch placed in track-local absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub track: usize,
    pub pitch: u8,
    pub start: Rational,
    pub duration: Rational,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub tracks: Vec<Track>,
    pub tempo_bpm: u16,
}

impl Composition {
    pub fn new(tracks: Vec<Track>, tempo_bpm: u16) -> Self {
        Composition { tracks, tempo_bpm }
    }

    /// Flatten every chord into per-pitch events. Each track starts at time
    /// 0 and advances by each chord's duration; rests only advance.
    pub fn note_events(&self) -> Vec<NoteEvent> {
        let mut events = Vec::new();
        for (track_index, track) in self.tracks.iter().enumerate() {
            let mut time = Rational::zero();
            for chord in track.chords() {
                events.extend(chord.pitches().iter().map(|&pitch| NoteEvent {
                    track: track_index,
                    pitch,
                    start: time,
                    duration: chord.duration(),
                    velocity: chord.velocity(),
                }));
                time += chord.duration();
            }
        }
        events
    }

    /// Length of the longest track.
    pub fn length(&self) -> Rational {
        self.tracks
            .iter()
            .map(Track::length)
            .max()
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per track: name, instrument, attack count and length.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for track in &self.tracks {
            let attacks = track.chords().iter().filter(|c| !c.is_rest()).count();
            let kind = if track.is_percussion() { "drums" } else { "program" };
            let _ = writeln!(
                out,
                "{:>16}: {kind} {:>3}, {:>5} attacks, {:.1} beats",
                track.name,
                track.program(),
                attacks,
                track.length().to_f64()
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(n: i64) -> Rational {
        Rational::from_int(n)
    }

    #[test]
    fn chord_is_an_ordered_set() {
        let c = Chord::new(vec![67, 60, 64, 60], beats(1), 90);
        assert_eq!(c.pitches(), &[60, 64, 67]);
        assert!(!c.is_rest());
        assert!(Chord::rest(beats(2)).is_rest());
        assert_eq!(Chord::rest(beats(2)).velocity(), DEFAULT_VELOCITY);
    }

    #[test]
    fn midi_key_bounds() {
        assert_eq!(midi_key(0).unwrap(), 0);
        assert_eq!(midi_key(127).unwrap(), 127);
        assert!(matches!(midi_key(128), Err(MusicError::PitchOutOfRange(128))));
        assert!(matches!(midi_key(-1), Err(MusicError::PitchOutOfRange(-1))));
        assert_eq!(midi_velocity(200), 127);
        assert_eq!(midi_velocity(-5), 0);
    }

    #[test]
    fn append_one_and_many() {
        let mut t = Track::new("Bass", 35);
        t.append_one(Chord::rest(beats(1)));
        t.append_many(vec![
            Chord::new(vec![36], beats(2), 100),
            Chord::rest(Rational::new(1, 2)),
        ]);
        assert_eq!(t.chords().len(), 3);
        assert_eq!(t.length(), Rational::new(7, 2));
    }

    #[test]
    fn percussion_program_decoding() {
        let drums = Track::new("Kit", -26);
        assert!(drums.is_percussion());
        assert_eq!(drums.program(), 25);
        assert_eq!(Track::new("Lowest", -128).program(), 127);
        assert_eq!(Track::new("Piano", 0).program(), 0);
    }

    #[test]
    fn note_events_use_running_offsets_per_track() {
        let mut a = Track::new("A", 0);
        a.append_many(vec![
            Chord::rest(beats(1)),
            Chord::new(vec![60, 64], beats(2), 80),
            Chord::new(vec![62], Rational::new(1, 2), 70),
        ]);
        let mut b = Track::new("B", -1);
        b.append_one(Chord::new(vec![36], beats(1), 100));

        let events = Composition::new(vec![a, b], 120).note_events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].start, beats(1));
        assert_eq!(events[1].start, beats(1));
        assert_eq!(events[1].pitch, 64);
        assert_eq!(events[2].start, beats(3));
        assert_eq!(events[2].duration, Rational::new(1, 2));
        assert_eq!(events[3].track, 1);
        assert_eq!(events[3].start, Rational::zero());
    }

    #[test]
    fn json_export_roundtrips() {
        let mut t = Track::new("Pad", 89);
        t.append_one(Chord::new(vec![60, 67], Rational::new(3, 2), 20));
        let comp = Composition::new(vec![t], 100);
        let json = comp.to_json().unwrap();
        let back: Composition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, comp);
        assert!(comp.summary().contains("Pad"));
    }
}
