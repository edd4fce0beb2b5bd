// Ramify Music Generator
//
// An algorithmic multi-track composer. Rhythm and harmony both come from
// valuations: how often a number divides by a radix decides how strong a
// beat is, how heavily a pitch class is weighted, and how each bar of the
// piece differs from its neighbours. Simple integer generators (linear,
// uniform random, random walk) then pick attacks, durations, velocities and
// pitches out of those weighted grids.
//
// Architecture:
// - valuation.rs: p-adic valuations and the ramification valuation
// - scale.rs: step patterns to pitch-class scales
// - pitch_index.rs: periodic pitch sets with membership and range queries
// - harmony.rs: weighted pitch classes over a septatonic scale
// - rational.rs: exact time arithmetic
// - metrum.rs: hierarchical metrical grids with per-beat weights
// - generator.rs: Lin / Rnd / Walk integer generators
// - motive.rs: one bar of chords from a metrum slice and generators
// - track.rs: chords, tracks, compositions and note-event flattening
// - arrangement.rs: the demonstration piece (drum kit plus seven parts)
// - midi.rs: Standard MIDI File output
// - config.rs: settings for the `generate` binary
// - error.rs: crate error type
//
// Output is deterministic given a seed; randomness flows only through
// `ramify_prng::SeededRng` values handed to the generators.

pub mod arrangement;
pub mod config;
pub mod error;
pub mod generator;
pub mod harmony;
pub mod metrum;
pub mod midi;
pub mod motive;
pub mod pitch_index;
pub mod rational;
pub mod scale;
pub mod track;
pub mod valuation;
