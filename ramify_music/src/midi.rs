// Standard MIDI File output for a Composition.
//
// Layout (SMF Format 1):
// - Track 0 is the "Meta" track: tempo plus every program change.
// - One MIDI track per composition track, named after it.
//
// Channels: each distinct melodic instrument gets its own channel, assigned
// in ascending program order and skipping the drum channel. Every percussion
// track plays on channel 9 with program `-1 - id`.
//
// Composition time is in quarter notes; it is scaled to ticks and rounded,
// so durations stay exact up to one tick and every note lasts at least one.
// Uses the `midly` crate.

use crate::error::{MusicError, Result};
use crate::rational::Rational;
use crate::track::{Composition, Track};
use log::info;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// General MIDI percussion channel (zero-based).
pub const DRUM_CHANNEL: u8 = 9;

/// Melodic instrument id to output channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    melodic: BTreeMap<i8, u8>,
    percussion: BTreeSet<i8>,
}

impl ChannelMap {
    pub fn for_tracks(tracks: &[Track]) -> Result<Self> {
        let (percussion, melodic_ids): (BTreeSet<i8>, BTreeSet<i8>) = tracks
            .iter()
            .map(|t| t.instrument)
            .partition(|&id| id < 0);

        let available = (0u8..16).filter(|&c| c != DRUM_CHANNEL);
        if melodic_ids.len() > available.clone().count() {
            return Err(MusicError::TooManyChannels(melodic_ids.len()));
        }
        let melodic = melodic_ids.into_iter().zip(available).collect();
        Ok(ChannelMap {
            melodic,
            percussion,
        })
    }

    pub fn channel(&self, track: &Track) -> u8 {
        if track.is_percussion() {
            DRUM_CHANNEL
        } else {
            self.melodic[&track.instrument]
        }
    }

    /// (channel, program) pairs to announce at time 0.
    fn program_changes(&self) -> Vec<(u8, u8)> {
        let drums = self
            .percussion
            .iter()
            .map(|&id| (DRUM_CHANNEL, (-1 - id as i16) as u8));
        let melodic = self.melodic.iter().map(|(&id, &ch)| (ch, id as u8));
        drums.chain(melodic).collect()
    }
}

/// Convert a Composition to MIDI and write it to a file.
pub fn write_midi(composition: &Composition, path: &Path) -> Result<()> {
    let bytes = to_midi_bytes(composition)?;
    std::fs::write(path, &bytes)?;
    info!(
        "wrote {} tracks ({} bytes) to {}",
        composition.tracks.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Encode a Composition as Standard MIDI File bytes.
pub fn to_midi_bytes(composition: &Composition) -> Result<Vec<u8>> {
    let smf = composition_to_smf(composition)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

fn composition_to_smf(composition: &Composition) -> Result<Smf<'_>> {
    let channels = ChannelMap::for_tracks(&composition.tracks)?;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: meta track
    let mut meta: Vec<TrackEvent<'_>> = Vec::new();
    meta.push(at_zero(TrackEventKind::Meta(MetaMessage::TrackName(b"Meta"))));
    let tempo_microseconds = (60_000_000 / composition.tempo_bpm.max(1) as u32).min(MAX_TEMPO);
    meta.push(at_zero(TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
        tempo_microseconds,
    )))));
    for (channel, program) in channels.program_changes() {
        meta.push(at_zero(TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::ProgramChange {
                program: u7::new(program),
            },
        }));
    }
    meta.push(at_zero(TrackEventKind::Meta(MetaMessage::EndOfTrack)));
    smf.tracks.push(meta);

    let events = composition.note_events();
    for (index, track) in composition.tracks.iter().enumerate() {
        let channel = u4::new(channels.channel(track));

        // (tick, note-off before note-on, key, velocity)
        let mut timeline: Vec<(u32, bool, u8, u8)> = Vec::new();
        for event in events.iter().filter(|e| e.track == index) {
            let on = to_ticks(event.start);
            // Sub-tick notes still sound for one tick, so each off follows its on.
            let off = to_ticks(event.start + event.duration).max(on + 1);
            timeline.push((on, true, event.pitch, event.velocity));
            timeline.push((off, false, event.pitch, 0));
        }
        timeline.sort_by_key(|&(tick, is_on, key, _)| (tick, is_on, key));

        let mut midi_track: Vec<TrackEvent<'_>> = Vec::with_capacity(timeline.len() + 2);
        midi_track.push(at_zero(TrackEventKind::Meta(MetaMessage::TrackName(
            track.name.as_bytes(),
        ))));
        let mut last_tick = 0;
        for (tick, is_on, key, vel) in timeline {
            let message = if is_on {
                MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                }
            } else {
                MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                }
            };
            midi_track.push(TrackEvent {
                delta: u28::new(tick - last_tick),
                kind: TrackEventKind::Midi { channel, message },
            });
            last_tick = tick;
        }
        midi_track.push(at_zero(TrackEventKind::Meta(MetaMessage::EndOfTrack)));
        smf.tracks.push(midi_track);
    }

    Ok(smf)
}

fn at_zero(kind: TrackEventKind<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind,
    }
}

/// Largest delta-time a MIDI variable-length quantity can hold, less the
/// one tick a note-off may be pushed past its note-on.
const MAX_TICK: i64 = (1 << 28) - 2;

/// Largest microseconds-per-quarter a tempo event can carry (about 3.6 BPM).
const MAX_TEMPO: u32 = (1 << 24) - 1;

fn to_ticks(time: Rational) -> u32 {
    time.scaled_round(TICKS_PER_QUARTER as i64).clamp(0, MAX_TICK) as u32
}
